//! HTTP adapter for the story engine's REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use ttrpg_shared::ErrorDetail;

use crate::ports::outbound::{ApiError, RawApiPort};

/// Default story engine base URL.
pub const DEFAULT_STORY_ENGINE_URL: &str = "http://127.0.0.1:8003";

/// `RawApiPort` over reqwest
#[derive(Clone)]
pub struct ApiAdapter {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiAdapter {
    /// Fails only when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::RequestFailed(format!("Invalid base URL {base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::RequestFailed(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else if error.is_connect() {
            ApiError::Unavailable(format!("Is the story engine running at {}?", self.base_url))
        } else {
            ApiError::RequestFailed(error.to_string())
        }
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Value, ApiError> {
        tracing::debug!(method, path, "Story engine request");

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = status_error(status, &body);
            tracing::warn!(
                method,
                path,
                status = status.as_u16(),
                error = %error,
                "Story engine request failed"
            );
            return Err(error);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }
}

/// Map a non-2xx response, preferring the service's `detail` message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorDetail>(body)
        .map(|detail| detail.message())
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(message)
    } else {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RawApiPort for ApiAdapter {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.send("GET", path, self.client.get(self.url(path))).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send("POST", path, self.client.post(self.url(path)).json(body))
            .await
    }

    async fn post_empty_with_response_json(&self, path: &str) -> Result<Value, ApiError> {
        self.send("POST", path, self.client.post(self.url(path))).await
    }
}
