//! Video service trait.

use crate::error::Result;
use crate::video::operation::OperationHandle;
use crate::video::types::VideoGenerationRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// The remote side of a generation job.
///
/// Every call takes the credential explicitly; implementations hold no key of their own.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Starts a job and returns its first handle.
    async fn submit(
        &self,
        request: &VideoGenerationRequest,
        api_key: &str,
    ) -> Result<OperationHandle>;

    /// Re-fetches the status of a job.
    async fn poll(&self, operation: &OperationHandle, api_key: &str) -> Result<OperationHandle>;

    /// Fetches the video bytes behind a download link.
    async fn download(&self, uri: &str, api_key: &str) -> Result<Vec<u8>>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str {
        "Veo (Google)"
    }
}

#[async_trait]
impl<T: VideoService + ?Sized> VideoService for Arc<T> {
    async fn submit(
        &self,
        request: &VideoGenerationRequest,
        api_key: &str,
    ) -> Result<OperationHandle> {
        (**self).submit(request, api_key).await
    }

    async fn poll(&self, operation: &OperationHandle, api_key: &str) -> Result<OperationHandle> {
        (**self).poll(operation, api_key).await
    }

    async fn download(&self, uri: &str, api_key: &str) -> Result<Vec<u8>> {
        (**self).download(uri, api_key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
