//! Error types for bridging operations.

use thiserror::Error;

/// Result type for bridging operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while bridging a browser participant and a phone call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An external provider call failed (network, auth, validation, rate
    /// limit). Carries the provider's message; never retried automatically.
    #[error("provider error: {0}")]
    Provider(String),

    /// No pending bridge is bound to the given call id: either an unknown or
    /// forged callback, or a binding already consumed.
    #[error("no pending bridge for call {call_id}")]
    NotFound { call_id: String },

    /// A required configuration value is missing or malformed. Fatal at
    /// startup.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The requested transition is not available in the current phase, e.g.
    /// ending a call when none was ever dialed.
    #[error("invalid state: {message}")]
    InvalidState { message: String },
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Provider(err.to_string())
    }
}
