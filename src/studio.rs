//! Interactive session around the generator: key gate, one job at a time, user-facing failures.

use crate::error::{AnimakerError, FailureKind, Result};
use crate::video::{GeneratedVideo, ProgressSink, VideoGenerationRequest, VideoGenerator};
use std::sync::Arc;

const CREDENTIAL_FAILURE_MESSAGE: &str =
    "API Key is invalid or not found. Please select a valid API key.";

/// A failed generation, ready to show to the user.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct GenerationFailure {
    /// Whether the user should pick another key.
    pub kind: FailureKind,
    /// Text to display verbatim.
    pub message: String,
    /// The underlying error.
    #[source]
    pub source: AnimakerError,
}

impl From<AnimakerError> for GenerationFailure {
    fn from(source: AnimakerError) -> Self {
        let kind = source.kind();
        let message = match kind {
            FailureKind::Credential => CREDENTIAL_FAILURE_MESSAGE.to_string(),
            FailureKind::Generation => format!("Generation failed: {source}"),
        };
        Self {
            kind,
            message,
            source,
        }
    }
}

/// One user's session.
///
/// `generate` takes `&mut self`, so a studio never has two jobs in flight.
pub struct Studio {
    generator: VideoGenerator,
    credential_ready: bool,
}

impl Studio {
    /// Creates a studio, asking the credential provider whether a key is already chosen.
    pub async fn new(generator: VideoGenerator) -> Self {
        let credential_ready = generator.credentials().has_credential().await;
        Self {
            generator,
            credential_ready,
        }
    }

    /// Returns the name of the video service jobs are sent to.
    pub fn service_name(&self) -> &str {
        self.generator.service_name()
    }

    /// Returns true if a key is believed to be selected.
    pub fn has_credential(&self) -> bool {
        self.credential_ready
    }

    /// Asks the user to choose a key.
    ///
    /// On success the key is assumed usable; the next job verifies it.
    pub async fn select_credential(&mut self) -> Result<()> {
        self.generator.credentials().select_credential().await?;
        self.credential_ready = true;
        Ok(())
    }

    /// Runs one job.
    ///
    /// Prompts for a key first if none is selected. A credential failure marks the key
    /// as unusable and prompts for a new one before returning.
    pub async fn generate(
        &mut self,
        request: &VideoGenerationRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> std::result::Result<GeneratedVideo, GenerationFailure> {
        if !self.credential_ready {
            self.select_credential().await?;
        }

        let err = match self.generator.generate(request, progress).await {
            Ok(video) => return Ok(video),
            Err(err) => GenerationFailure::from(err),
        };
        tracing::warn!(kind = ?err.kind, "video generation failed: {}", err.source);

        if err.kind == FailureKind::Credential {
            self.credential_ready = false;
            if let Err(select_err) = self.select_credential().await {
                tracing::warn!("API key re-selection failed: {select_err}");
            }
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialProvider;
    use crate::video::service::fake::{Call, ScriptedService};
    use crate::video::OperationHandle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const OP: &str = "models/veo-3.1-fast-generate-preview/operations/op1";
    const URI: &str = "https://example.com/files/v1:download?alt=media";

    /// Credentials whose selection hands out the next key from a list.
    struct SelectableCredentials {
        key: Mutex<Option<String>>,
        next_keys: Mutex<Vec<String>>,
        selections: AtomicUsize,
    }

    impl SelectableCredentials {
        fn new(initial: Option<&str>, next_keys: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                key: Mutex::new(initial.map(str::to_string)),
                next_keys: Mutex::new(next_keys.iter().rev().map(|k| k.to_string()).collect()),
                selections: AtomicUsize::new(0),
            })
        }

        fn selections(&self) -> usize {
            self.selections.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialProvider for SelectableCredentials {
        async fn has_credential(&self) -> bool {
            self.key.lock().unwrap().is_some()
        }

        async fn select_credential(&self) -> Result<()> {
            self.selections.fetch_add(1, Ordering::SeqCst);
            let next = self
                .next_keys
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AnimakerError::Auth("selection cancelled".into()))?;
            *self.key.lock().unwrap() = Some(next);
            Ok(())
        }

        async fn credential(&self) -> Option<String> {
            self.key.lock().unwrap().clone()
        }
    }

    async fn studio(
        service: &Arc<ScriptedService>,
        credentials: &Arc<SelectableCredentials>,
    ) -> Studio {
        let generator = VideoGenerator::builder()
            .service(Arc::clone(service))
            .credentials(Arc::clone(credentials) as Arc<dyn CredentialProvider>)
            .build()
            .unwrap();
        Studio::new(generator).await
    }

    fn quiet() -> Arc<dyn ProgressSink> {
        Arc::new(|_: &str| {})
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_job_submits_once() {
        let service = Arc::new(
            ScriptedService::new()
                .on_submit(Ok(OperationHandle::pending(OP)))
                .on_poll(Ok(OperationHandle::succeeded(OP, URI)))
                .on_download(Ok(vec![9])),
        );
        let creds = SelectableCredentials::new(Some("secret"), &[]);
        let mut studio = studio(&service, &creds).await;
        assert!(studio.has_credential());

        let video = studio
            .generate(&VideoGenerationRequest::new("test"), quiet())
            .await
            .unwrap();
        assert_eq!(video.data, vec![9]);

        let submits = service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Submit { .. }))
            .count();
        assert_eq!(submits, 1);
        assert_eq!(creds.selections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entity_not_found_prompts_reselection() {
        let service = Arc::new(
            ScriptedService::new()
                .on_submit(Ok(OperationHandle::pending(OP)))
                .on_poll(Ok(OperationHandle::failed(
                    OP,
                    "Requested entity was not found.",
                ))),
        );
        let creds = SelectableCredentials::new(Some("stale"), &["fresh"]);
        let mut studio = studio(&service, &creds).await;

        let failure = studio
            .generate(&VideoGenerationRequest::new("test"), quiet())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Credential);
        assert_eq!(failure.message, CREDENTIAL_FAILURE_MESSAGE);
        assert_eq!(creds.selections(), 1);
        assert_eq!(creds.credential().await.as_deref(), Some("fresh"));
        assert!(studio.has_credential());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_failure_keeps_key() {
        let service = Arc::new(
            ScriptedService::new()
                .on_submit(Ok(OperationHandle::pending(OP)))
                .on_poll(Ok(OperationHandle::failed(OP, "Quota exceeded"))),
        );
        let creds = SelectableCredentials::new(Some("secret"), &["other"]);
        let mut studio = studio(&service, &creds).await;

        let failure = studio
            .generate(&VideoGenerationRequest::new("test"), quiet())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Generation);
        assert_eq!(
            failure.message,
            "Generation failed: Operation failed: Quota exceeded"
        );
        assert_eq!(creds.selections(), 0);
        assert!(studio.has_credential());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_key_is_selected_before_submitting() {
        let service = Arc::new(
            ScriptedService::new()
                .on_submit(Ok(OperationHandle::succeeded(OP, URI)))
                .on_download(Ok(vec![1])),
        );
        let creds = SelectableCredentials::new(None, &["picked"]);
        let mut studio = studio(&service, &creds).await;
        assert!(!studio.has_credential());

        studio
            .generate(&VideoGenerationRequest::new("test"), quiet())
            .await
            .unwrap();
        assert_eq!(creds.selections(), 1);
        assert_eq!(
            service.calls()[0],
            Call::Submit {
                prompt: "test".into(),
                api_key: "picked".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_selection_fails_without_network() {
        let service = Arc::new(ScriptedService::new());
        let creds = SelectableCredentials::new(None, &[]);
        let mut studio = studio(&service, &creds).await;

        let failure = studio
            .generate(&VideoGenerationRequest::new("test"), quiet())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Credential);
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_failure_display_is_message() {
        let failure = GenerationFailure::from(AnimakerError::MissingArtifact);
        assert_eq!(
            failure.to_string(),
            "Generation failed: Video generation succeeded, but no download link was provided."
        );
    }
}
