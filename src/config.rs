use std::{env, fmt};

use crate::constants::*;
use crate::error::ChatError;
use crate::services::describe_secret;

/// Process-wide configuration, resolved once at startup and shared read-only.
#[derive(Clone)]
pub struct Settings {
    api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            api_key: get(API_KEY_ENV),
            model: resolve_model(get(MODEL_ENV)),
            api_base: get(API_BASE_ENV).unwrap_or_else(|| DEFAULT_API_BASE.into()),
            timeout_secs: get(TIMEOUT_ENV)
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            port: get(PORT_ENV)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Credential for the upstream call. Only its presence and length are logged.
    pub fn credential(&self) -> Result<&str, ChatError> {
        match self.api_key.as_deref() {
            Some(key) => {
                log::info!("🔑 {} {}", API_KEY_ENV, describe_secret(key));
                Ok(key)
            }
            None => {
                log::error!("❌ {} environment variable not set", API_KEY_ENV);
                Err(ChatError::MissingCredential)
            }
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "api_key",
                &self.api_key.as_deref().map(describe_secret).unwrap_or_else(|| "unset".into()),
            )
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("port", &self.port)
            .finish()
    }
}

/// Effective model: the override when present, otherwise the built-in default.
pub fn resolve_model(override_model: Option<String>) -> String {
    override_model.unwrap_or_else(|| DEFAULT_MODEL.to_string())
}
