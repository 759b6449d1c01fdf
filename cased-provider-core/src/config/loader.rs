use std::path::Path;

use crate::config::schema::{ProviderConfig, API_KEY_ENV, API_URL_ENV, WORKFLOWS_API_KEY_ENV};
use crate::error::{Error, Result};

pub fn load_from_file(path: &Path) -> Result<ProviderConfig> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        Error::Config(format!("failed to read config '{}': {err}", path.display()))
    })?;

    let is_json = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(&content).map_err(|err| {
            Error::Config(format!(
                "failed to parse config '{}': {err}",
                path.display()
            ))
        })
    } else {
        toml::from_str(&content).map_err(|err| {
            Error::Config(format!(
                "failed to parse config '{}': {err}",
                path.display()
            ))
        })
    }
}

pub fn load_from_env() -> ProviderConfig {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from an arbitrary variable source. Blank values count as
/// unset.
pub fn load_from_lookup<F>(lookup: F) -> ProviderConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };

    ProviderConfig {
        api_url: read(API_URL_ENV),
        workflows_api_key: read(WORKFLOWS_API_KEY_ENV),
        api_key: read(API_KEY_ENV),
        timeout_ms: None,
    }
}

/// Values set in `primary` win; `fallback` fills whatever is left unset.
pub fn merge(primary: ProviderConfig, fallback: ProviderConfig) -> ProviderConfig {
    ProviderConfig {
        api_url: primary.api_url.or(fallback.api_url),
        workflows_api_key: primary.workflows_api_key.or(fallback.workflows_api_key),
        api_key: primary.api_key.or(fallback.api_key),
        timeout_ms: primary.timeout_ms.or(fallback.timeout_ms),
    }
}

pub fn load(path: Option<&Path>) -> Result<ProviderConfig> {
    let env = load_from_env();
    match path {
        Some(path) => Ok(merge(load_from_file(path)?, env)),
        None => Ok(env),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "api_url = \"http://localhost:9000\"\nworkflows_api_key = \"wk_test\"\ntimeout_ms = 500"
        )
        .expect("write config");

        let config = load_from_file(file.path()).expect("config should load");
        assert_eq!(config.api_url(), "http://localhost:9000");
        assert_eq!(config.workflows_api_key.as_deref(), Some("wk_test"));
        assert_eq!(config.timeout_ms(), 500);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn loads_json_file_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        write!(file, r#"{{"api_key": "sk_test"}}"#).expect("write config");

        let config = load_from_file(file.path()).expect("config should load");
        assert_eq!(config.api_key.as_deref(), Some("sk_test"));
    }

    #[test]
    fn reports_parse_failures_with_path() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        write!(file, "api_url = [").expect("write config");

        let error = load_from_file(file.path()).expect_err("parse should fail");
        assert!(error.to_string().contains("failed to parse config"));
    }

    #[test]
    fn lookup_ignores_blank_values() {
        let vars = HashMap::from([
            (API_URL_ENV, "  ".to_owned()),
            (WORKFLOWS_API_KEY_ENV, "wk_env".to_owned()),
        ]);

        let config = load_from_lookup(|key| vars.get(key).cloned());
        assert!(config.api_url.is_none());
        assert_eq!(config.workflows_api_key.as_deref(), Some("wk_env"));
    }

    #[test]
    fn merge_prefers_primary_values() {
        let file = ProviderConfig {
            api_url: Some("http://file".to_owned()),
            ..ProviderConfig::default()
        };
        let env = ProviderConfig {
            api_url: Some("http://env".to_owned()),
            workflows_api_key: Some("wk_env".to_owned()),
            ..ProviderConfig::default()
        };

        let merged = merge(file, env);
        assert_eq!(merged.api_url(), "http://file");
        assert_eq!(merged.workflows_api_key.as_deref(), Some("wk_env"));
    }
}
