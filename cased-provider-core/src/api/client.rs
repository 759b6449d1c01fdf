use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::http_client::{build_client, default_headers};
use crate::error::{Error, Result};

/// Characters escaped when an identifier is placed in a URL path.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'%');

const NOT_FOUND_CODE: &str = "not_found";

/// Authenticated JSON client for one Cased API credential.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    api_label: &'static str,
    client: reqwest::Client,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api_label", &self.api_label)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_ms: u64,
        api_label: &'static str,
    ) -> Result<Self> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config(format!("missing {api_label} token")))?;

        let client = build_client(default_headers(token, api_label)?, timeout_ms, api_label)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_label,
            client,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None).await?;
        self.decode(path, &body)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let body = self.send(Method::POST, path, Some(payload)).await?;
        self.decode(path, &body)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let payload = serde_json::to_value(body)?;
        let body = self.send(Method::PATCH, path, Some(payload)).await?;
        self.decode(path, &body)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(payload) = payload.as_ref() {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|err| {
            Error::Http(format!(
                "{} {method} {path} failed: {err}",
                self.api_label
            ))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            Error::Http(format!(
                "failed to read {} response for {method} {path}: {err}",
                self.api_label
            ))
        })?;

        tracing::debug!(
            api = self.api_label,
            method = %method,
            path,
            status = status.as_u16(),
            "cased api request completed"
        );

        if status.as_u16() >= 300 {
            return Err(classify_error(status, &body, path));
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|err| {
            Error::Provider(format!(
                "failed to parse {} response for {path}: {err}",
                self.api_label
            ))
        })
    }
}

/// Encode a single path segment, e.g. a resource id.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiErrorDetail {
    pub resource: String,
    pub path: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiErrorResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ApiErrorResponse {
    fn is_empty(&self) -> bool {
        self.error.is_empty() && self.errors.is_empty() && self.message.is_empty()
    }
}

/// Map a non-success response to an error. A 404 status or an API
/// `not_found` code becomes `Error::NotFound`; everything else is passed
/// through as-is.
pub fn classify_error(status: StatusCode, body: &str, path: &str) -> Error {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();

    let api_not_found = parsed
        .as_ref()
        .map(|response| response.error == NOT_FOUND_CODE)
        .unwrap_or(false);
    if api_not_found || status == StatusCode::NOT_FOUND {
        return Error::NotFound(path.to_owned());
    }

    let message = match parsed {
        Some(response) if !response.is_empty() => serde_json::to_string(&response)
            .unwrap_or_else(|_| format!("status: {}, body: {body}", status.as_u16())),
        _ => format!("status: {}, body: {body}", status.as_u16()),
    };

    Error::Api {
        status: status.as_u16(),
        message,
    }
}
