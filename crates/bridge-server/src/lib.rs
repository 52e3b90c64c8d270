//! HTTP surface for the browser/PSTN call bridging service.

pub mod api;
pub mod config;

pub use api::{router, AppState};
pub use config::BridgeConfig;
