//! Call dispatcher: outbound PSTN dialing and termination, with no knowledge
//! of sessions.

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::provider::{DialRequest, VoiceProvider};
use crate::types::{CallHandle, CallId, CallPhase};

/// How long an outbound call rings before the provider abandons it.
pub const RING_TIMEOUT_SECS: u64 = 30;

pub struct CallDispatcher {
    voice: Arc<dyn VoiceProvider>,
}

impl CallDispatcher {
    pub fn new(voice: Arc<dyn VoiceProvider>) -> Self {
        Self { voice }
    }

    /// Dispatch an outbound call. Returns as soon as the provider accepts the
    /// dial; the answer arrives later on the webhook given by `answer_url`.
    pub async fn dial(&self, from: &str, to: &str, answer_url: &str) -> Result<CallHandle> {
        let request = DialRequest {
            from: from.to_string(),
            to: to.to_string(),
            answer_url: answer_url.to_string(),
            ring_timeout_secs: RING_TIMEOUT_SECS,
        };
        let call_id = self.voice.create_call(&request).await?;
        info!(%call_id, to, "outbound call dispatched");
        Ok(CallHandle {
            call_id,
            phase: CallPhase::Dialing,
        })
    }

    /// Ask the provider to complete the call. A call that is already ended or
    /// unknown comes back as a provider error; it is reported, not retried.
    pub async fn end(&self, call_id: &CallId) -> Result<()> {
        self.voice.end_call(call_id).await?;
        info!(%call_id, "outbound call ended");
        Ok(())
    }
}
