//! Session manager: create-or-reuse the media session and admit participants.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::provider::MediaProvider;
use crate::store::IdentityStore;
use crate::types::{Capability, Participant, SessionId};

/// Fixed capability policy: every participant this service admits publishes
/// audio only.
const PARTICIPANT_CAPABILITIES: &[Capability] = &[Capability::Audio];

pub struct SessionManager {
    media: Arc<dyn MediaProvider>,
    store: Arc<IdentityStore>,
}

impl SessionManager {
    pub fn new(media: Arc<dyn MediaProvider>, store: Arc<IdentityStore>) -> Self {
        Self { media, store }
    }

    /// Return the active session, creating one on the provider if none exists
    /// yet. Once created the id is cached and reused for the rest of the
    /// process lifetime; the provider is not called again.
    pub async fn ensure_session(&self, tag: &str) -> Result<SessionId> {
        if let Some(session_id) = self.store.cached_session().await {
            debug!(%session_id, "reusing active media session");
            return Ok(session_id);
        }
        let session = self.media.create_session(tag).await?;
        info!(session_id = %session.id, "created media session");
        self.store.cache_session(session.id.clone()).await;
        Ok(session.id)
    }

    /// Mint a participant identity and join token under the fixed
    /// audio-publish-only policy.
    pub async fn create_participant(&self, tag: &str) -> Result<Participant> {
        let participant = self
            .media
            .create_participant(tag, PARTICIPANT_CAPABILITIES)
            .await?;
        info!(participant_id = %participant.id, tag, "created participant");
        Ok(participant)
    }

    /// Attach a participant to a session. Until this returns `Ok` the
    /// participant must not be handed to a client.
    pub async fn admit_participant(
        &self,
        participant: &Participant,
        session_id: &SessionId,
    ) -> Result<()> {
        self.media
            .admit_participant(&participant.id, session_id)
            .await?;
        info!(participant_id = %participant.id, %session_id, "admitted participant");
        Ok(())
    }
}
