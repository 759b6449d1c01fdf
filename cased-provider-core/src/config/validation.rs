use crate::config::schema::{ProviderConfig, WORKFLOWS_API_KEY_ENV};
use crate::error::{Error, Result};

pub fn validate_config(config: &ProviderConfig) -> Result<()> {
    let api_url = config.api_url();
    let parsed = reqwest::Url::parse(api_url).map_err(|err| {
        Error::Validation(format!("api_url '{api_url}' is not a valid URL: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Validation(format!(
            "api_url '{api_url}' must use http or https"
        )));
    }

    match config.workflows_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {}
        _ => {
            return Err(Error::Validation(format!(
                "workflows_api_key must be set (or provided via {WORKFLOWS_API_KEY_ENV})"
            )));
        }
    }

    if let Some(key) = config.api_key.as_deref() {
        if key.trim().is_empty() {
            return Err(Error::Validation("api_key cannot be empty".to_owned()));
        }
    }

    if config.timeout_ms() == 0 {
        return Err(Error::Validation(
            "timeout_ms must be greater than zero".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_config;
    use crate::config::schema::ProviderConfig;

    fn valid_config() -> ProviderConfig {
        ProviderConfig {
            api_url: Some("https://api.cased.com".to_owned()),
            workflows_api_key: Some("wk_test".to_owned()),
            api_key: None,
            timeout_ms: None,
        }
    }

    #[test]
    fn accepts_minimal_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_missing_workflows_key() {
        let mut config = valid_config();
        config.workflows_api_key = None;

        let error = validate_config(&config).expect_err("validation should fail");
        assert!(error.to_string().contains("workflows_api_key must be set"));
    }

    #[test]
    fn rejects_non_http_url() {
        let mut config = valid_config();
        config.api_url = Some("ftp://api.cased.com".to_owned());

        let error = validate_config(&config).expect_err("validation should fail");
        assert!(error.to_string().contains("must use http or https"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = valid_config();
        config.timeout_ms = Some(0);

        assert!(validate_config(&config).is_err());
    }
}
