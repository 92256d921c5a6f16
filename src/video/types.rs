//! Core types for video generation.

use crate::error::{AnimakerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Prompt offered when the user has not written one yet.
pub const DEFAULT_PROMPT: &str =
    "A stylish anime character walking through a neon-lit futuristic city in the rain, lofi style.";

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VeoModel {
    /// Veo 3.1 Fast - quicker turnaround, lower fidelity.
    #[default]
    #[serde(rename = "veo-3.1-fast-generate-preview")]
    Fast,
    /// Veo 3.1 - full quality.
    #[serde(rename = "veo-3.1-generate-preview")]
    HighQuality,
}

impl VeoModel {
    /// All model variants, fastest first.
    pub const ALL: [VeoModel; 2] = [VeoModel::Fast, VeoModel::HighQuality];

    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "veo-3.1-fast-generate-preview",
            Self::HighQuality => "veo-3.1-generate-preview",
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fast => "Veo 3.1 Fast",
            Self::HighQuality => "Veo 3.1 HQ",
        }
    }
}

impl std::fmt::Display for VeoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VeoModel {
    type Err = AnimakerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fast" | "veo-3.1-fast-generate-preview" => Ok(Self::Fast),
            "hq" | "veo-3.1-generate-preview" => Ok(Self::HighQuality),
            other => Err(AnimakerError::InvalidRequest(format!(
                "unknown model: {other}"
            ))),
        }
    }
}

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the API string for this ratio.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AnimakerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(AnimakerError::InvalidRequest(format!(
                "unsupported aspect ratio: {other} (expected 16:9 or 9:16)"
            ))),
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 1280x720.
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    /// 1920x1080.
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    /// Returns the API string for this resolution.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = AnimakerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "720p" => Ok(Self::Hd720),
            "1080p" => Ok(Self::Hd1080),
            other => Err(AnimakerError::InvalidRequest(format!(
                "unsupported resolution: {other} (expected 720p or 1080p)"
            ))),
        }
    }
}

/// A request to generate a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Model variant to run.
    pub model: VeoModel,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Output resolution.
    pub resolution: Resolution,
}

impl VideoGenerationRequest {
    /// Creates a new request with the given prompt and default options.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: VeoModel::default(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }

    /// Sets the model variant.
    pub fn with_model(mut self, model: VeoModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Rejects requests that cannot be submitted.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(AnimakerError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(())
    }
}

/// Metadata about the video generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Wall-clock generation time in milliseconds.
    pub duration_ms: Option<u64>,
    /// Requested resolution.
    pub resolution: Option<String>,
    /// Requested aspect ratio.
    pub aspect_ratio: Option<String>,
    /// Number of status re-fetches before the operation finished.
    pub poll_count: u32,
}

/// A generated video with its data and metadata.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    /// Raw video bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g., "video/mp4").
    pub mime_type: String,
    /// Generation metadata.
    pub metadata: VideoMetadata,
}

impl GeneratedVideo {
    /// Creates a new generated video.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, metadata: VideoMetadata) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            metadata,
        }
    }

    /// Returns the size of the video data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the video to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the video data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the video as a data URL, ready for an HTML `<video>` element.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}
