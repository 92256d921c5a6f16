#![warn(missing_docs)]
//! Animaker - text-to-video generation with Google Veo.
//!
//! A generation job is a long-running operation: the request is submitted, the
//! operation handle is re-fetched every ten seconds until the service reports it
//! done, and the finished video is downloaded with a second authenticated fetch.
//! While the job runs, progress messages are pushed to a [`ProgressSink`].
//!
//! # Quick Start
//!
//! ```no_run
//! use animaker::{AspectRatio, VeoModel, VideoGenerationRequest, VideoGenerator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> animaker::Result<()> {
//!     let generator = VideoGenerator::builder().build()?;
//!     let request = VideoGenerationRequest::new("A samurai dueling under a cherry blossom tree")
//!         .with_model(VeoModel::Fast)
//!         .with_aspect_ratio(AspectRatio::Landscape);
//!     let video = generator
//!         .generate(&request, Arc::new(|msg: &str| eprintln!("{msg}")))
//!         .await?;
//!     video.save("samurai.mp4")?;
//!     Ok(())
//! }
//! ```
//!
//! # Credentials
//!
//! The API key is never read from global state by the generator itself. It asks an
//! injected [`CredentialProvider`]: [`EnvCredentials`] (the default) reads
//! `GOOGLE_API_KEY` or `API_KEY`, [`PromptCredentials`] asks on the terminal, and
//! [`StaticCredentials`] holds a fixed key.
//!
//! # Features
//!
//! - `cli` (default): the `animaker` command-line interface

pub mod credentials;
mod error;
pub mod studio;
pub mod video;

// Re-export error types at crate root
pub use error::{is_credential_message, AnimakerError, FailureKind, Result};

pub use credentials::{CredentialProvider, EnvCredentials, PromptCredentials, StaticCredentials};
pub use studio::{GenerationFailure, Studio};
pub use video::{
    AspectRatio, GeminiVideoService, GeneratedVideo, OperationHandle, OperationState,
    ProgressSink, Resolution, VeoModel, VideoGenerationRequest, VideoGenerator, VideoMetadata,
    VideoService,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
    pub use crate::error::{AnimakerError, Result};
    pub use crate::studio::Studio;
    pub use crate::video::{
        GeneratedVideo, ProgressSink, VideoGenerationRequest, VideoGenerator, VideoService,
    };
}
