//! Provider seams and their HTTP implementations.
//!
//! The orchestrator only sees the [`MediaProvider`] and [`VoiceProvider`]
//! traits; the reqwest-backed implementations below talk to the vendor REST
//! APIs with basic auth and JSON bodies. Every failure, from a refused
//! connection to a 4xx validation error, surfaces as
//! [`BridgeError::Provider`] with the provider's message attached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::types::{
    Capability, CallId, JoinToken, MediaSession, Participant, ParticipantId, SessionId,
};

/// Media-session provider: sessions, participants, join tokens.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Create a new media session carrying the given audit tag.
    async fn create_session(&self, tag: &str) -> Result<MediaSession>;

    /// Mint a participant identity and its join token, scoped to the given
    /// capability set.
    async fn create_participant(
        &self,
        tag: &str,
        capabilities: &[Capability],
    ) -> Result<Participant>;

    /// Attach a participant to a session. The participant is not usable until
    /// this succeeds.
    async fn admit_participant(
        &self,
        participant_id: &ParticipantId,
        session_id: &SessionId,
    ) -> Result<()>;
}

/// Everything the voice provider needs to place one outbound call.
#[derive(Debug, Clone)]
pub struct DialRequest {
    pub from: String,
    pub to: String,
    /// URL the provider will POST to when the callee answers.
    pub answer_url: String,
    /// How long to let the call ring before the provider gives up.
    pub ring_timeout_secs: u64,
}

/// Voice provider: outbound PSTN calls.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Dispatch an outbound call. Returns as soon as the provider accepts the
    /// request; answer is signaled later through the answer webhook.
    async fn create_call(&self, request: &DialRequest) -> Result<CallId>;

    /// Move the call's provider-side state to completed.
    async fn end_call(&self, call_id: &CallId) -> Result<()>;
}

/// Shared credential set for both vendor APIs.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub account_id: String,
    pub username: String,
    pub password: String,
}

async fn into_provider_error(response: reqwest::Response) -> BridgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BridgeError::Provider(format!("{status}: {body}"))
}

#[derive(Deserialize)]
struct SessionCreated {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantCreated {
    participant: ParticipantBody,
    token: String,
}

#[derive(Deserialize)]
struct ParticipantBody {
    id: String,
}

/// Media-session provider client over its REST API.
pub struct HttpMediaProvider {
    http: reqwest::Client,
    base_url: String,
    credentials: ProviderCredentials,
}

impl HttpMediaProvider {
    pub fn new(base_url: impl Into<String>, credentials: ProviderCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/accounts/{}/{}",
            self.base_url, self.credentials.account_id, suffix
        )
    }
}

#[async_trait]
impl MediaProvider for HttpMediaProvider {
    async fn create_session(&self, tag: &str) -> Result<MediaSession> {
        let response = self
            .http
            .post(self.account_url("sessions"))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&json!({ "tag": tag }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_provider_error(response).await);
        }
        let created: SessionCreated = response.json().await?;
        debug!(session_id = %created.id, "media session created");
        Ok(MediaSession {
            id: SessionId(created.id),
            tag: Some(tag.to_string()),
        })
    }

    async fn create_participant(
        &self,
        tag: &str,
        capabilities: &[Capability],
    ) -> Result<Participant> {
        let response = self
            .http
            .post(self.account_url("participants"))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&json!({
                "tag": tag,
                "publishPermissions": capabilities,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_provider_error(response).await);
        }
        let created: ParticipantCreated = response.json().await?;
        debug!(participant_id = %created.participant.id, "participant created");
        Ok(Participant {
            id: ParticipantId(created.participant.id),
            token: JoinToken::new(created.token),
            tag: tag.to_string(),
        })
    }

    async fn admit_participant(
        &self,
        participant_id: &ParticipantId,
        session_id: &SessionId,
    ) -> Result<()> {
        let url = self.account_url(&format!(
            "sessions/{session_id}/participants/{participant_id}"
        ));
        let response = self
            .http
            .put(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_provider_error(response).await);
        }
        debug!(%participant_id, %session_id, "participant admitted to session");
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCallBody<'a> {
    from: &'a str,
    to: &'a str,
    application_id: &'a str,
    answer_url: &'a str,
    answer_method: &'a str,
    call_timeout: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallCreated {
    call_id: String,
}

/// Voice provider client over its REST API.
pub struct HttpVoiceProvider {
    http: reqwest::Client,
    base_url: String,
    credentials: ProviderCredentials,
    application_id: String,
}

impl HttpVoiceProvider {
    pub fn new(
        base_url: impl Into<String>,
        credentials: ProviderCredentials,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
            application_id: application_id.into(),
        }
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/accounts/{}/{}",
            self.base_url, self.credentials.account_id, suffix
        )
    }
}

#[async_trait]
impl VoiceProvider for HttpVoiceProvider {
    async fn create_call(&self, request: &DialRequest) -> Result<CallId> {
        let body = CreateCallBody {
            from: &request.from,
            to: &request.to,
            application_id: &self.application_id,
            answer_url: &request.answer_url,
            answer_method: "POST",
            call_timeout: request.ring_timeout_secs,
        };
        let response = self
            .http
            .post(self.account_url("calls"))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_provider_error(response).await);
        }
        let created: CallCreated = response.json().await?;
        Ok(CallId(created.call_id))
    }

    async fn end_call(&self, call_id: &CallId) -> Result<()> {
        let response = self
            .http
            .post(self.account_url(&format!("calls/{call_id}")))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&json!({ "state": "completed" }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(into_provider_error(response).await);
        }
        Ok(())
    }
}
