//! Long-running operation handles returned by the video service.

use serde::{Deserialize, Serialize};

/// A server-side generation job, as last reported by the service.
///
/// Handles are never patched: every poll replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Server-assigned operation name (e.g. `models/veo-3.1-fast-generate-preview/operations/abc`).
    pub name: String,
    #[serde(default)]
    done: Option<bool>,
    /// Error payload, set when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    /// Result payload, set when the job succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
}

/// Error payload of a failed operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    /// RPC status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result payload of a finished operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Veo payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

/// Samples produced by a finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    /// Generated videos, usually exactly one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_samples: Option<Vec<GeneratedSample>>,
}

/// One generated video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSample {
    /// The video file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoReference>,
}

/// Download reference for a generated video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoReference {
    /// HTTPS download link; needs the API key appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Where an operation stands, derived from its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    /// Still running.
    Pending,
    /// Finished with an error payload.
    Failed {
        /// Reason reported by the service.
        message: String,
    },
    /// Finished without error; the download link may still be absent.
    Succeeded {
        /// Download link of the first sample.
        video_uri: Option<String>,
    },
}

impl OperationHandle {
    /// Creates a pending handle with the given name.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a finished handle carrying a download link.
    pub fn succeeded(name: impl Into<String>, video_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: Some(true),
            error: None,
            response: Some(OperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: Some(vec![GeneratedSample {
                        video: Some(VideoReference {
                            uri: Some(video_uri.into()),
                        }),
                    }]),
                }),
            }),
        }
    }

    /// Creates a finished handle carrying an error message.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: Some(true),
            error: Some(OperationError {
                code: None,
                message: Some(message.into()),
            }),
            response: None,
        }
    }

    /// Returns true once the service reports the job finished.
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Download link of the first generated sample, if any.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .as_ref()?
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }

    /// Projects the handle onto its terminal-or-not state.
    ///
    /// A finished handle with an error payload is `Failed` even when a response is also present.
    pub fn state(&self) -> OperationState {
        if !self.is_done() {
            return OperationState::Pending;
        }
        if let Some(err) = &self.error {
            return OperationState::Failed {
                message: err
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            };
        }
        OperationState::Succeeded {
            video_uri: self.video_uri().map(str::to_string),
        }
    }
}
