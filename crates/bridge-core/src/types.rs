//! Core identifier and record types for the bridging service.
//!
//! Identifiers are opaque provider-assigned strings wrapped in newtypes so the
//! three id spaces (media session, participant, outbound call) cannot be
//! confused at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a media session on the media provider.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a participant admitted (or being admitted) to a session.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an outbound call on the voice provider.
///
/// Every id returned by a dial is unique and is the only valid key into the
/// pending-bridge lookup.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallId(pub String);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer credential granting a media client entry to a session as a specific
/// participant. Treated as a secret: `Debug` is redacted and the token never
/// appears in logs. Read the raw value with [`JoinToken::expose`].
#[derive(Clone, Deserialize)]
pub struct JoinToken(String);

impl JoinToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for embedding in a client response or a transfer
    /// directive. Callers must not log the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JoinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JoinToken(<redacted>)")
    }
}

/// What a participant is allowed to do inside a session. This service admits
/// audio publishers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Capability {
    Audio,
}

/// A media session on the provider side.
#[derive(Debug, Clone)]
pub struct MediaSession {
    pub id: SessionId,
    /// Free-form audit label, not interpreted by the provider.
    pub tag: Option<String>,
}

/// A participant identity minted by the media provider together with its join
/// token. The token is the only artifact the eventual media client needs.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub token: JoinToken,
    /// Correlation label chosen by the caller; must not carry personal data.
    pub tag: String,
}

/// A participant parked against an outbound call, waiting for the answer
/// webhook to move the call's media into its session.
#[derive(Debug, Clone)]
pub struct PendingBridge {
    pub session_id: SessionId,
    pub participant: Participant,
}

/// Lifecycle phase of an outbound call as this service last observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Dialing,
    Answered,
    Transferred,
    Ended,
    Failed,
}

/// An outbound call as returned by the dispatcher.
#[derive(Debug, Clone)]
pub struct CallHandle {
    pub call_id: CallId,
    pub phase: CallPhase,
}

/// Phase of the active bridge attempt. The bracketed PSTN path
/// (`Dialing` onward) is only entered when a dial is requested; the
/// browser-only flow terminates at `ParticipantAdmitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Idle,
    SessionReady,
    ParticipantAdmitted,
    Dialing,
    Answered,
    Transferred,
    Ended,
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BridgePhase::Idle => "idle",
            BridgePhase::SessionReady => "session-ready",
            BridgePhase::ParticipantAdmitted => "participant-admitted",
            BridgePhase::Dialing => "dialing",
            BridgePhase::Answered => "answered",
            BridgePhase::Transferred => "transferred",
            BridgePhase::Ended => "ended",
        };
        f.write_str(name)
    }
}
