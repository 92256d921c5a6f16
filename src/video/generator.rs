//! Job orchestration: submit, poll until done, download.

use crate::credentials::{CredentialProvider, EnvCredentials};
use crate::error::{AnimakerError, Result};
use crate::video::gemini::GeminiVideoService;
use crate::video::operation::{OperationHandle, OperationState};
use crate::video::service::VideoService;
use crate::video::status::{
    ProgressSink, StatusReporter, DOWNLOADING_MESSAGE, FINALIZING_MESSAGE, INITIALIZING_MESSAGE,
    IN_PROGRESS_MESSAGE,
};
use crate::video::types::{GeneratedVideo, VideoGenerationRequest, VideoMetadata};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Builder for VideoGenerator.
pub struct VideoGeneratorBuilder {
    service: Option<Arc<dyn VideoService>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    poll_interval: Duration,
    status_interval: Duration,
}

impl Default for VideoGeneratorBuilder {
    fn default() -> Self {
        Self {
            service: None,
            credentials: None,
            poll_interval: Duration::from_secs(10),
            status_interval: Duration::from_secs(5),
        }
    }
}

impl VideoGeneratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the video service. Defaults to [`GeminiVideoService`].
    pub fn service(mut self, service: impl VideoService + 'static) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    /// Sets where the API key comes from. Defaults to [`EnvCredentials`].
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the delay between status re-fetches.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the delay between flavor-text progress messages.
    pub fn status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Builds the generator.
    pub fn build(self) -> Result<VideoGenerator> {
        let service = match self.service {
            Some(service) => service,
            None => Arc::new(GeminiVideoService::builder().build()?),
        };
        if self.poll_interval.is_zero() || self.status_interval.is_zero() {
            return Err(AnimakerError::InvalidRequest(
                "poll and status intervals must be non-zero".into(),
            ));
        }

        Ok(VideoGenerator {
            service,
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(EnvCredentials)),
            poll_interval: self.poll_interval,
            status_interval: self.status_interval,
        })
    }
}

/// Runs one generation job from submission to downloaded bytes.
pub struct VideoGenerator {
    service: Arc<dyn VideoService>,
    credentials: Arc<dyn CredentialProvider>,
    poll_interval: Duration,
    status_interval: Duration,
}

impl VideoGenerator {
    /// Creates a new `VideoGeneratorBuilder`.
    pub fn builder() -> VideoGeneratorBuilder {
        VideoGeneratorBuilder::new()
    }

    /// Returns the credential provider this generator reads keys from.
    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Returns the name of the underlying service.
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Generates a video, reporting progress to `progress` along the way.
    ///
    /// Flavor-text updates stop before this returns, whatever the outcome.
    pub async fn generate(
        &self,
        request: &VideoGenerationRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<GeneratedVideo> {
        request.validate()?;
        let api_key = self.credentials.credential().await.ok_or_else(|| {
            AnimakerError::Auth("no API key selected. Set GOOGLE_API_KEY or API_KEY.".into())
        })?;
        let start = Instant::now();

        progress.update(INITIALIZING_MESSAGE);
        let operation = self.service.submit(request, &api_key).await?;
        tracing::info!(
            operation = %operation.name,
            model = request.model.as_str(),
            "submitted video generation request"
        );

        let (operation, poll_count) = {
            let _status = StatusReporter::start(self.status_interval, Arc::clone(&progress));
            progress.update(IN_PROGRESS_MESSAGE);
            self.wait_until_done(operation, &api_key, start).await?
        };
        progress.update(FINALIZING_MESSAGE);

        let video_uri = match operation.state() {
            OperationState::Succeeded { video_uri: Some(uri) } => uri,
            OperationState::Succeeded { video_uri: None } => {
                return Err(AnimakerError::MissingArtifact);
            }
            OperationState::Failed { message } => {
                return Err(AnimakerError::OperationFailed(message));
            }
            OperationState::Pending => {
                return Err(AnimakerError::OperationFailed(format!(
                    "operation {} stopped before completing",
                    operation.name
                )));
            }
        };
        tracing::debug!(url = %video_uri, "video generation complete");

        progress.update(DOWNLOADING_MESSAGE);
        let data = self.service.download(&video_uri, &api_key).await?;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            operation = %operation.name,
            bytes = data.len(),
            duration_ms,
            "downloaded generated video"
        );

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoMetadata {
                model: Some(request.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
                resolution: Some(request.resolution.to_string()),
                aspect_ratio: Some(request.aspect_ratio.to_string()),
                poll_count,
            },
        ))
    }

    /// Re-fetches the handle every `poll_interval` until the service reports it done.
    ///
    /// A failed re-fetch aborts the wait.
    async fn wait_until_done(
        &self,
        mut operation: OperationHandle,
        api_key: &str,
        start: Instant,
    ) -> Result<(OperationHandle, u32)> {
        let mut poll_count = 0;
        while !operation.is_done() {
            tokio::time::sleep(self.poll_interval).await;
            operation = self.service.poll(&operation, api_key).await?;
            poll_count += 1;
            tracing::debug!(
                operation = %operation.name,
                poll_count,
                elapsed_secs = start.elapsed().as_secs(),
                done = operation.is_done(),
                "polled Veo video generation"
            );
        }
        Ok((operation, poll_count))
    }
}
