use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.cased.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const API_URL_ENV: &str = "CASED_API_URL";
pub const WORKFLOWS_API_KEY_ENV: &str = "CASED_WORKFLOWS_API_KEY";
pub const API_KEY_ENV: &str = "CASED_API_KEY";

/// Provider-level settings. Every field is optional on disk so file and
/// environment layers can be merged; accessors resolve the defaults.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_url: Option<String>,
    pub workflows_api_key: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ProviderConfig {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("workflows_api_key", &redact(&self.workflows_api_key))
            .field("api_key", &redact(&self.api_key))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
