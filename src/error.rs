//! Error types for video generation.

/// Text the Gemini API returns when the selected key cannot see the requested model.
///
/// The API exposes no structured code for this case, so the message text is all there is.
const CREDENTIAL_NOT_FOUND: &str = "Requested entity was not found";

/// Longest error body carried into an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur during video generation.
#[derive(Debug, thiserror::Error)]
pub enum AnimakerError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response on submit or poll.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The operation finished with its own error payload.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// The operation succeeded but carried no download link.
    #[error("Video generation succeeded, but no download link was provided.")]
    MissingArtifact,

    /// The video download was rejected or could not be attempted.
    #[error("Failed to download video: {0}")]
    Download(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed download or service URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad category of a failed generation, as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential is missing, invalid, or cannot reach the model.
    Credential,
    /// Anything else: transport, job, artifact, or download failures.
    Generation,
}

impl AnimakerError {
    /// Classifies this error for presentation.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Auth(_) => FailureKind::Credential,
            other if is_credential_message(&other.to_string()) => FailureKind::Credential,
            _ => FailureKind::Generation,
        }
    }

    /// Returns true if the user should be asked to pick another credential.
    pub fn is_credential_error(&self) -> bool {
        self.kind() == FailureKind::Credential
    }
}

/// Returns true if an error text means the credential must be re-selected.
///
/// This is the only place that depends on the upstream wording.
pub fn is_credential_message(text: &str) -> bool {
    text.contains(CREDENTIAL_NOT_FOUND)
}

/// Trims an error body and caps its length so HTML error pages don't flood messages.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}

/// Result type alias for video generation operations.
pub type Result<T> = std::result::Result<T, AnimakerError>;
