//! HTTP implementation of the render backend contract.
//!
//! Wire shape:
//! - `POST {base}/v1/renders` with the request JSON -> `{"id": "..."}`
//! - `GET  {base}/v1/renders/{id}` -> [`RenderStatus`] JSON

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use vforge_models::{RenderHandle, RenderRequest};

use crate::backend::{RenderBackend, RenderStatus};
use crate::error::{RenderError, RenderResult};

/// HTTP backend configuration.
#[derive(Clone)]
pub struct HttpBackendConfig {
    /// Base URL, e.g. `https://render.example.com`
    pub base_url: String,
    /// Bearer token, when the backend requires auth
    pub api_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RENDER_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8090".to_string()),
            api_token: std::env::var("RENDER_BACKEND_TOKEN").ok(),
            request_timeout: Duration::from_secs(
                std::env::var("RENDER_BACKEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

impl fmt::Debug for HttpBackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Render backend over HTTP + JSON.
pub struct HttpRenderBackend {
    client: reqwest::Client,
    config: HttpBackendConfig,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

impl HttpRenderBackend {
    /// Create a backend client from config.
    pub fn new(config: HttpBackendConfig) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RenderError::transient(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> RenderResult<Self> {
        Self::new(HttpBackendConfig::from_env())
    }

    fn renders_url(&self) -> String {
        format!("{}/v1/renders", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Read the backend's error message body, falling back to the
    /// status code when the body is not the expected JSON.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => format!("backend returned {status}"),
        }
    }
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn submit(&self, request: &RenderRequest) -> RenderResult<RenderHandle> {
        let url = self.renders_url();
        debug!(flow = request.flow_name(), url = %url, "Submitting render request");

        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| RenderError::transient(format!("Submit request failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() {
            // The payload will not get better on retry.
            return Err(RenderError::Submission(Self::error_message(response).await));
        }
        if !status.is_success() {
            return Err(RenderError::transient(Self::error_message(response).await));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| RenderError::submission(format!("Malformed submit response: {e}")))?;

        Ok(RenderHandle::from_string(body.id))
    }

    async fn poll_status(&self, handle: &RenderHandle) -> RenderResult<RenderStatus> {
        let url = format!("{}/{}", self.renders_url(), handle);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RenderError::transient(format!("Poll request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The backend no longer knows the handle; retrying cannot help.
            return Err(RenderError::Submission(Self::error_message(response).await));
        }
        if !status.is_success() {
            return Err(RenderError::transient(Self::error_message(response).await));
        }

        response
            .json::<RenderStatus>()
            .await
            .map_err(|e| RenderError::transient(format!("Malformed status response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RenderState;
    use serde_json::json;
    use vforge_models::{AspectRatio, AssetKind, AudioTrack, VisualAsset};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> RenderRequest {
        RenderRequest::SingleAsset {
            asset: VisualAsset {
                id: "asset-1".into(),
                url: "https://assets.example.com/asset-1.png".into(),
                kind: AssetKind::Image,
            },
            voiceover: AudioTrack {
                url: "https://assets.example.com/vo.mp3".into(),
                duration_secs: 12.0,
            },
            captions: Vec::new(),
            overlays: Vec::new(),
            aspect: AspectRatio::Vertical,
        }
    }

    fn backend(server: &MockServer) -> HttpRenderBackend {
        HttpRenderBackend::new(HttpBackendConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/renders"))
            .and(body_partial_json(json!({"flow": "single_asset"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r-123"})))
            .mount(&server)
            .await;

        let handle = backend(&server).submit(&request()).await.unwrap();
        assert_eq!(handle.as_str(), "r-123");
    }

    #[tokio::test]
    async fn test_submit_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/renders"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "r-1"})))
            .mount(&server)
            .await;

        let mut config = HttpBackendConfig::new(server.uri());
        config.api_token = Some("secret".into());
        let backend = HttpRenderBackend::new(config).unwrap();

        assert!(backend.submit(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejection_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/renders"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "voiceover url unreachable"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).submit(&request()).await.unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("voiceover url unreachable"));
    }

    #[tokio::test]
    async fn test_submit_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/renders"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = backend(&server).submit(&request()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_poll_maps_status_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/renders/r-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "state": "completed",
                "progress": 100,
                "result_url": "https://cdn.example.com/out.mp4"
            })))
            .mount(&server)
            .await;

        let status = backend(&server)
            .poll_status(&RenderHandle::from_string("r-9"))
            .await
            .unwrap();

        assert_eq!(status.state, RenderState::Completed);
        assert_eq!(status.progress, 100);
        assert_eq!(
            status.result_url.as_deref(),
            Some("https://cdn.example.com/out.mp4")
        );
    }

    #[tokio::test]
    async fn test_poll_network_failure_is_transient() {
        let server = MockServer::start().await;
        let backend = backend(&server);
        // Dropping the server leaves nothing listening on the port.
        drop(server);

        let err = backend
            .poll_status(&RenderHandle::from_string("r-1"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
