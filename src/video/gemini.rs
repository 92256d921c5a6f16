//! Veo over the Gemini Developer API.

use crate::error::{sanitize_error_message, AnimakerError, Result};
use crate::video::operation::OperationHandle;
use crate::video::service::VideoService;
use crate::video::types::{AspectRatio, Resolution, VideoGenerationRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Builder for GeminiVideoService.
#[derive(Debug, Clone, Default)]
pub struct GeminiVideoServiceBuilder {
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl GeminiVideoServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API root (defaults to `https://generativelanguage.googleapis.com`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the service, validating the base URL.
    pub fn build(self) -> Result<GeminiVideoService> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)?;

        Ok(GeminiVideoService {
            client: self.client.unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Veo video service speaking the Gemini `predictLongRunning` protocol.
#[derive(Debug, Clone)]
pub struct GeminiVideoService {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiVideoService {
    /// Creates a new `GeminiVideoServiceBuilder`.
    pub fn builder() -> GeminiVideoServiceBuilder {
        GeminiVideoServiceBuilder::new()
    }

    /// Returns the API root this service talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn submit_url(&self, request: &VideoGenerationRequest) -> String {
        format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url,
            request.model.as_str(),
        )
    }

    fn poll_url(&self, operation: &OperationHandle) -> String {
        format!("{}/v1beta/{}", self.base_url, operation.name)
    }

    async fn read_operation(&self, response: reqwest::Response) -> Result<OperationHandle> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoService for GeminiVideoService {
    async fn submit(
        &self,
        request: &VideoGenerationRequest,
        api_key: &str,
    ) -> Result<OperationHandle> {
        let body = PredictRequest::from_request(request);

        let response = self
            .client
            .post(self.submit_url(request))
            .header(API_KEY_HEADER, api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        self.read_operation(response).await
    }

    async fn poll(&self, operation: &OperationHandle, api_key: &str) -> Result<OperationHandle> {
        let response = self
            .client
            .get(self.poll_url(operation))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        self.read_operation(response).await
    }

    async fn download(&self, uri: &str, api_key: &str) -> Result<Vec<u8>> {
        let url = download_url(uri, api_key)?;

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnimakerError::Download(status.to_string()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Appends the API key to a download link as the `key` query parameter.
fn download_url(uri: &str, api_key: &str) -> Result<Url> {
    if uri.starts_with("gs://") {
        return Err(AnimakerError::Download(format!(
            "{uri} is a Google Cloud Storage URI and cannot be fetched over HTTP"
        )));
    }
    let mut url = Url::parse(uri)?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

fn parse_error(status: u16, text: &str) -> AnimakerError {
    let message = serde_json::from_str::<ErrorEnvelope>(text)
        .ok()
        .and_then(|e| e.error.message)
        .map(|m| sanitize_error_message(&m))
        .unwrap_or_else(|| sanitize_error_message(text));

    match status {
        401 | 403 => AnimakerError::Auth(message),
        _ => AnimakerError::Api { status, message },
    }
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    aspect_ratio: AspectRatio,
    resolution: Resolution,
    number_of_videos: u32,
}

impl<'a> PredictRequest<'a> {
    fn from_request(req: &'a VideoGenerationRequest) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: &req.prompt,
            }],
            parameters: PredictParameters {
                aspect_ratio: req.aspect_ratio,
                resolution: req.resolution,
                number_of_videos: 1,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::types::VeoModel;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OP_NAME: &str = "models/veo-3.1-fast-generate-preview/operations/abc123";

    async fn service_for(server: &MockServer) -> GeminiVideoService {
        GeminiVideoService::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_wire_format() {
        let req = VideoGenerationRequest::new("Ocean waves")
            .with_aspect_ratio(AspectRatio::Portrait)
            .with_resolution(Resolution::Hd1080);
        let json = serde_json::to_value(PredictRequest::from_request(&req)).unwrap();

        assert_eq!(json["instances"][0]["prompt"], "Ocean waves");
        assert_eq!(json["parameters"]["aspectRatio"], "9:16");
        assert_eq!(json["parameters"]["resolution"], "1080p");
        assert_eq!(json["parameters"]["numberOfVideos"], 1);
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let result = GeminiVideoService::builder().base_url("not a url").build();
        assert!(matches!(result, Err(AnimakerError::Url(_))));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let service = GeminiVideoService::builder()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(service.base_url(), "http://localhost:8080");
        let req = VideoGenerationRequest::new("x").with_model(VeoModel::HighQuality);
        assert_eq!(
            service.submit_url(&req),
            "http://localhost:8080/v1beta/models/veo-3.1-generate-preview:predictLongRunning"
        );
    }

    #[test]
    fn test_download_url_appends_key() {
        let url = download_url(
            "https://generativelanguage.googleapis.com/v1beta/files/abc:download?alt=media",
            "secret",
        )
        .unwrap();
        assert_eq!(url.query(), Some("alt=media&key=secret"));

        let url = download_url("https://example.com/video.mp4", "secret").unwrap();
        assert_eq!(url.query(), Some("key=secret"));
    }

    #[test]
    fn test_download_url_rejects_gcs() {
        let err = download_url("gs://bucket/video.mp4", "secret").unwrap_err();
        assert!(matches!(err, AnimakerError::Download(_)));
        assert!(err.to_string().contains("Google Cloud Storage"));
    }

    #[test]
    fn test_parse_error_uses_envelope_message() {
        let body = r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#;
        let err = parse_error(404, body);
        match &err {
            AnimakerError::Api { status, message } => {
                assert_eq!(*status, 404);
                assert_eq!(message, "Requested entity was not found.");
            }
            other => panic!("Expected Api error, got: {:?}", other),
        }
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_parse_error_auth_and_plain_text() {
        assert!(matches!(
            parse_error(403, r#"{"error": {"message": "API key not valid"}}"#),
            AnimakerError::Auth(m) if m == "API key not valid"
        ));
        assert!(matches!(
            parse_error(500, "  upstream exploded "),
            AnimakerError::Api { status: 500, message } if message == "upstream exploded"
        ));
    }

    #[tokio::test]
    async fn test_submit_posts_prompt_and_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning",
            ))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(serde_json::json!({
                "instances": [{"prompt": "test"}],
                "parameters": {"aspectRatio": "16:9", "resolution": "720p", "numberOfVideos": 1}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let op = service
            .submit(&VideoGenerationRequest::new("test"), "secret")
            .await
            .unwrap();
        assert_eq!(op.name, OP_NAME);
        assert!(!op.is_done());
    }

    #[tokio::test]
    async fn test_submit_error_keeps_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let err = service
            .submit(&VideoGenerationRequest::new("test"), "stale-key")
            .await
            .unwrap_err();
        assert!(err.is_credential_error(), "got: {err}");
    }

    #[tokio::test]
    async fn test_poll_fetches_operation_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{OP_NAME}")))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": OP_NAME,
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": "https://example.com/files/abc:download?alt=media"}}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let op = service
            .poll(&OperationHandle::pending(OP_NAME), "secret")
            .await
            .unwrap();
        assert!(op.is_done());
        assert_eq!(
            op.video_uri(),
            Some("https://example.com/files/abc:download?alt=media")
        );
    }

    #[tokio::test]
    async fn test_download_sends_key_as_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/abc:download"))
            .and(query_param("alt", "media"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 0, 0, 0x18, 0x66]))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let uri = format!("{}/files/abc:download?alt=media", server.uri());
        let bytes = service.download(&uri, "secret").await.unwrap();
        assert_eq!(bytes, vec![0u8, 0, 0, 0x18, 0x66]);
    }

    #[tokio::test]
    async fn test_download_failure_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let uri = format!("{}/files/abc:download", server.uri());
        let err = service.download(&uri, "secret").await.unwrap_err();
        assert!(matches!(err, AnimakerError::Download(_)));
        assert_eq!(err.to_string(), "Failed to download video: 403 Forbidden");
    }
}
