//! Identity store: which session is active, and which participant is waiting
//! on which call.
//!
//! The store is the only state shared between the dial request and the answer
//! webhook; the two tasks are correlated solely through the call-id keyed
//! pending map, never through shared stack or closure state.

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};
use crate::types::{CallId, PendingBridge, SessionId};

/// Owned, injectable store for the single active bridge attempt.
///
/// The session and call fields are singletons (one bridge at a time); the
/// pending map is keyed by call id so the answer webhook can join back to the
/// originating dial without any other shared state.
#[derive(Default)]
pub struct IdentityStore {
    /// Active media session, cached for the process lifetime once created.
    active_session: RwLock<Option<SessionId>>,
    /// Participants parked against an outbound call, awaiting transfer.
    pending: DashMap<CallId, PendingBridge>,
    /// Last dispatched outbound call. A second dial before the first resolves
    /// overwrites this; single-flight is an accepted limitation.
    active_call: RwLock<Option<CallId>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached active session, if one has been created.
    pub async fn cached_session(&self) -> Option<SessionId> {
        self.active_session.read().await.clone()
    }

    /// Cache the active session id. Two first requests racing may both create
    /// a session on the provider; the last write wins here and the loser's
    /// session is simply never used.
    pub async fn cache_session(&self, session_id: SessionId) {
        let mut active = self.active_session.write().await;
        if let Some(existing) = active.as_ref() {
            if *existing != session_id {
                warn!(%existing, %session_id, "replacing cached session id (racing create)");
            }
        }
        *active = Some(session_id);
    }

    /// Bind a participant to the outbound call that should carry it into the
    /// session. Overwriting an existing key is unexpected but tolerated; last
    /// write wins.
    pub fn bind_pending(&self, call_id: CallId, bridge: PendingBridge) {
        if let Some(previous) = self.pending.insert(call_id.clone(), bridge) {
            warn!(
                %call_id,
                participant = %previous.participant.id,
                "overwrote pending bridge binding"
            );
        }
        debug!(%call_id, "bound pending bridge");
    }

    /// Atomically remove and return the binding for `call_id`. Yields the
    /// participant at most once: a second take with the same id fails with
    /// [`BridgeError::NotFound`], meaning either an unknown or forged
    /// callback or a binding already consumed.
    pub fn take_pending(&self, call_id: &CallId) -> Result<PendingBridge> {
        self.pending
            .remove(call_id)
            .map(|(_, bridge)| bridge)
            .ok_or_else(|| BridgeError::NotFound {
                call_id: call_id.0.clone(),
            })
    }

    /// Record the call id of the most recent dial.
    pub async fn set_active_call(&self, call_id: CallId) {
        let mut active = self.active_call.write().await;
        if let Some(previous) = active.as_ref() {
            if *previous != call_id {
                warn!(%previous, %call_id, "overwriting tracked call id (single-flight)");
            }
        }
        *active = Some(call_id);
    }

    /// The call id of the most recent dial. Retained after the call ends so a
    /// repeated end request still reaches the provider (and surfaces its
    /// error).
    pub async fn active_call(&self) -> Option<CallId> {
        self.active_call.read().await.clone()
    }

    /// Drop all tracked state: cached session, pending bindings, active call.
    pub async fn reset(&self) {
        *self.active_session.write().await = None;
        *self.active_call.write().await = None;
        self.pending.clear();
    }
}
