//! Video generation module.

mod gemini;
mod generator;
mod operation;
pub(crate) mod service;
mod status;
mod types;

pub use gemini::{GeminiVideoService, GeminiVideoServiceBuilder};
pub use generator::{VideoGenerator, VideoGeneratorBuilder};
pub use operation::{
    GenerateVideoResponse, GeneratedSample, OperationError, OperationHandle, OperationResponse,
    OperationState, VideoReference,
};
pub use service::VideoService;
pub use status::{
    message_for_tick, ProgressSink, StatusReporter, DOWNLOADING_MESSAGE, FINALIZING_MESSAGE,
    INITIALIZING_MESSAGE, IN_PROGRESS_MESSAGE, LOADING_MESSAGES,
};
pub use types::{
    AspectRatio, GeneratedVideo, Resolution, VeoModel, VideoGenerationRequest, VideoMetadata,
    DEFAULT_PROMPT,
};
