//! Environment-driven configuration.
//!
//! The process refuses to start without provider credentials and an account
//! id; every other bridging setting is also required up front, since all
//! endpoints except the browser flow are unusable without them and a late
//! failure would only surface as a confusing provider error.

use callbridge_core::{BridgeError, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MEDIA_API_URL: &str = "https://api.webrtc.example.com/v1";
const DEFAULT_VOICE_API_URL: &str = "https://voice.example.com/api/v2";

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub account_id: String,
    pub api_username: String,
    pub api_password: String,
    pub voice_application_id: String,
    /// Public base URL of this service; the answer callback URL is derived
    /// from it.
    pub base_callback_url: String,
    pub from_number: String,
    pub to_number: String,
    pub media_api_url: String,
    pub voice_api_url: String,
    pub port: u16,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup, so tests can feed
    /// values without touching process-global environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| BridgeError::Configuration {
                    message: format!("missing required environment variable {name}"),
                })
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| BridgeError::Configuration {
                message: format!("PORT is not a valid port number: {raw}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            account_id: require("ACCOUNT_ID")?,
            api_username: require("API_USERNAME")?,
            api_password: require("API_PASSWORD")?,
            voice_application_id: require("VOICE_APPLICATION_ID")?,
            base_callback_url: require("BASE_CALLBACK_URL")?
                .trim_end_matches('/')
                .to_string(),
            from_number: require("FROM_NUMBER")?,
            to_number: require("TO_NUMBER")?,
            media_api_url: lookup("MEDIA_API_URL").unwrap_or_else(|| DEFAULT_MEDIA_API_URL.into()),
            voice_api_url: lookup("VOICE_API_URL").unwrap_or_else(|| DEFAULT_VOICE_API_URL.into()),
            port,
        })
    }

    /// The URL the voice provider calls when the outbound call is answered.
    pub fn answer_url(&self) -> String {
        format!("{}/callAnswered", self.base_callback_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ACCOUNT_ID", "acct-1"),
            ("API_USERNAME", "user"),
            ("API_PASSWORD", "pass"),
            ("VOICE_APPLICATION_ID", "app-1"),
            ("BASE_CALLBACK_URL", "https://bridge.example.com/"),
            ("FROM_NUMBER", "+15551110000"),
            ("TO_NUMBER", "+15552220000"),
        ])
    }

    #[test]
    fn full_environment_loads() {
        let env = full_env();
        let config = BridgeConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.account_id, "acct-1");
        assert_eq!(config.port, DEFAULT_PORT);
        // Trailing slash is stripped before the callback path is appended.
        assert_eq!(config.answer_url(), "https://bridge.example.com/callAnswered");
    }

    #[test]
    fn missing_credentials_refuse_to_start() {
        let mut env = full_env();
        env.remove("API_PASSWORD");

        let err = BridgeConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
        assert!(err.to_string().contains("API_PASSWORD"));
    }

    #[test]
    fn empty_account_id_is_rejected() {
        let mut env = full_env();
        env.insert("ACCOUNT_ID", "");

        let err = BridgeConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut env = full_env();
        env.insert("PORT", "not-a-port");

        let err = BridgeConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }
}
