use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub fn normalize_timeout_ms(timeout_ms: u64) -> u64 {
    if timeout_ms == 0 {
        DEFAULT_TIMEOUT_MS
    } else {
        timeout_ms
    }
}

/// Headers sent with every request: bearer auth plus JSON negotiation.
pub fn default_headers(token: &str, api_label: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut authorization = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
        Error::Config(format!("invalid {api_label} token for authorization header: {err}"))
    })?;
    authorization.set_sensitive(true);

    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

pub fn build_client(
    headers: HeaderMap,
    timeout_ms: u64,
    api_label: &str,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(std::time::Duration::from_millis(normalize_timeout_ms(
            timeout_ms,
        )))
        .build()
        .map_err(|err| Error::Provider(format!("failed to build {api_label} client: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_uses_default() {
        assert_eq!(normalize_timeout_ms(0), DEFAULT_TIMEOUT_MS);
        assert_eq!(normalize_timeout_ms(1_500), 1_500);
    }

    #[test]
    fn default_headers_carry_bearer_token() {
        let headers = default_headers("wk_123", "workflows").expect("headers should build");
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer wk_123")
        );
        assert!(headers.get(AUTHORIZATION).map(|v| v.is_sensitive()).unwrap_or(false));
        assert_eq!(
            headers.get(ACCEPT).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn rejects_token_with_control_characters() {
        let error = default_headers("bad\ntoken", "workflows").expect_err("should fail");
        assert!(error.to_string().contains("invalid workflows token"));
    }
}
