//! Core of the browser/PSTN call bridging service.
//!
//! A bridge pairs one telephone call with one browser participant inside the
//! same media session. The pieces, leaves first:
//!
//! - [`store::IdentityStore`] — which session is active, which participant is
//!   waiting on which call.
//! - [`session::SessionManager`] — create-or-reuse the media session, admit
//!   participants.
//! - [`dialer::CallDispatcher`] — place and end outbound PSTN calls.
//! - [`orchestrator::BridgeOrchestrator`] — the state machine sequencing
//!   session → admission → dial → answer-triggered transfer → teardown.
//!
//! The answer webhook and the dial request run on independent tasks with no
//! shared transaction boundary; they meet only through the identity store's
//! call-id keyed lookup.

pub mod dialer;
pub mod directive;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod store;
pub mod types;

pub use dialer::{CallDispatcher, RING_TIMEOUT_SECS};
pub use error::{BridgeError, Result};
pub use orchestrator::{AnswerOutcome, BridgeOrchestrator, DialPlan};
pub use provider::{
    DialRequest, HttpMediaProvider, HttpVoiceProvider, MediaProvider, ProviderCredentials,
    VoiceProvider,
};
pub use session::SessionManager;
pub use store::IdentityStore;
pub use types::{
    BridgePhase, CallHandle, CallId, CallPhase, Capability, JoinToken, MediaSession, Participant,
    ParticipantId, PendingBridge, SessionId,
};
