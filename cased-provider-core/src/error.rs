use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// True when the remote service reported the resource as gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn only_not_found_is_classified_as_absent() {
        assert!(Error::NotFound("workflow wf_1".to_owned()).is_not_found());
        assert!(!Error::Api {
            status: 500,
            message: "boom".to_owned()
        }
        .is_not_found());
        assert!(!Error::Validation("bad".to_owned()).is_not_found());
    }

    #[test]
    fn api_error_display_includes_status() {
        let error = Error::Api {
            status: 422,
            message: "{\"error\":\"invalid\"}".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "api error (status 422): {\"error\":\"invalid\"}"
        );
    }
}
