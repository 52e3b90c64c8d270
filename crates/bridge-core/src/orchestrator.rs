//! Bridge orchestrator: the state machine that sequences session creation,
//! participant admission, outbound dialing, answer-triggered transfer and
//! teardown.
//!
//! The phases are explicit (`BridgePhase`) and every transition is logged.
//! The answer webhook and the originating dial request run as independent
//! tasks; their only rendezvous is the call-id keyed lookup in the identity
//! store, so the `Answered -> Transferred` transition is guaranteed to
//! observe a binding written before the dial returned.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::dialer::CallDispatcher;
use crate::directive::transfer_document;
use crate::error::{BridgeError, Result};
use crate::session::SessionManager;
use crate::store::IdentityStore;
use crate::types::{BridgePhase, CallHandle, CallId, JoinToken, PendingBridge};

/// The numbers and callback URL for the outbound leg, resolved from
/// configuration by the caller.
#[derive(Debug, Clone)]
pub struct DialPlan {
    pub from: String,
    pub to: String,
    /// Public URL the voice provider will POST the answer event to.
    pub answer_url: String,
}

/// What the answer webhook should send back to the voice provider.
#[derive(Debug)]
pub enum AnswerOutcome {
    /// A transfer directive moving the call's media into the session.
    Transfer(String),
    /// Bare success acknowledgment: unknown or already-consumed call id. The
    /// provider requires a 200-class response either way.
    Acknowledged,
}

pub struct BridgeOrchestrator {
    store: Arc<IdentityStore>,
    sessions: SessionManager,
    dialer: CallDispatcher,
    phase: RwLock<BridgePhase>,
}

impl BridgeOrchestrator {
    pub fn new(
        store: Arc<IdentityStore>,
        sessions: SessionManager,
        dialer: CallDispatcher,
    ) -> Self {
        Self {
            store,
            sessions,
            dialer,
            phase: RwLock::new(BridgePhase::Idle),
        }
    }

    /// The phase of the current bridge attempt, for observability.
    pub async fn phase(&self) -> BridgePhase {
        *self.phase.read().await
    }

    async fn advance(&self, next: BridgePhase) {
        let mut phase = self.phase.write().await;
        info!(from = %*phase, to = %next, "bridge phase transition");
        *phase = next;
    }

    /// Browser-only flow: ensure the session exists, admit a browser
    /// participant, return its join token. The client joins directly with the
    /// token; no telephone leg is involved.
    pub async fn start_browser_call(&self, tag: &str) -> Result<JoinToken> {
        let session_id = self.sessions.ensure_session(tag).await?;
        self.advance(BridgePhase::SessionReady).await;

        let participant = self.sessions.create_participant(tag).await?;
        self.sessions.admit_participant(&participant, &session_id).await?;
        self.advance(BridgePhase::ParticipantAdmitted).await;

        Ok(participant.token)
    }

    /// PSTN flow: ensure the session exists, admit a participant for the
    /// phone leg, dial out, and park the participant against the new call id
    /// until the answer webhook fires.
    ///
    /// Single-flight: a second dial before the first resolves overwrites the
    /// tracked call id.
    pub async fn start_pstn_call(&self, tag: &str, plan: &DialPlan) -> Result<CallHandle> {
        let session_id = self.sessions.ensure_session(tag).await?;
        self.advance(BridgePhase::SessionReady).await;

        let participant = self.sessions.create_participant(tag).await?;
        self.sessions.admit_participant(&participant, &session_id).await?;
        self.advance(BridgePhase::ParticipantAdmitted).await;

        let handle = self
            .dialer
            .dial(&plan.from, &plan.to, &plan.answer_url)
            .await?;
        self.store.bind_pending(
            handle.call_id.clone(),
            PendingBridge {
                session_id,
                participant,
            },
        );
        self.store.set_active_call(handle.call_id.clone()).await;
        self.advance(BridgePhase::Dialing).await;

        Ok(handle)
    }

    /// Answer webhook transition. Takes the pending bridge for `call_id` (at
    /// most once) and produces the transfer directive; an unknown or
    /// already-consumed id is acknowledged as a no-op so the provider never
    /// sees a failure here.
    pub async fn handle_answer(&self, call_id: &CallId) -> AnswerOutcome {
        match self.store.take_pending(call_id) {
            Ok(bridge) => {
                self.advance(BridgePhase::Answered).await;
                let directive = transfer_document(&bridge.participant.token, call_id);
                info!(
                    %call_id,
                    participant_id = %bridge.participant.id,
                    session_id = %bridge.session_id,
                    "transferring answered call into session"
                );
                self.advance(BridgePhase::Transferred).await;
                AnswerOutcome::Transfer(directive)
            }
            Err(err) => {
                warn!(%call_id, %err, "answer for unknown or already-bridged call, acknowledging");
                AnswerOutcome::Acknowledged
            }
        }
    }

    /// End the active outbound call. Defined from any phase after a dial has
    /// happened; the provider decides whether the call can still be ended and
    /// its refusal (e.g. a double end) is surfaced as a provider error.
    pub async fn end_call(&self) -> Result<CallId> {
        let Some(call_id) = self.store.active_call().await else {
            return Err(BridgeError::InvalidState {
                message: "no outbound call has been dialed".to_string(),
            });
        };
        self.dialer.end(&call_id).await?;
        self.advance(BridgePhase::Ended).await;
        Ok(call_id)
    }
}
