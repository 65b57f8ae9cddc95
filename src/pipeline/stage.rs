// src/pipeline/stage.rs
//! Declarative description of a single provider call inside a pipeline.

use serde::Serialize;
use serde_json::Value;

use crate::models::generation::{ArtifactReference, GenerationRequest};

/// The four kinds of generation call a pipeline can chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    TextToImage,
    TextToVideo,
    ImageToVideo,
    VideoToAudio,
}

impl StageKind {
    /// Whether this stage consumes the artifact produced by the previous one.
    pub fn needs_prior_artifact(&self) -> bool {
        matches!(self, StageKind::ImageToVideo | StageKind::VideoToAudio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "580p")]
    P580,
    #[serde(rename = "720p")]
    P720,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    #[serde(rename = "landscape_16_9")]
    Landscape16x9,
    #[serde(rename = "portrait_16_9")]
    Portrait16x9,
    SquareHd,
}

/// Where the stage's text prompt comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptSource {
    /// The user's prompt followed by `", {suffix}"`.
    User { style_suffix: &'static str },
    /// A fixed prompt independent of the request.
    Fixed(&'static str),
}

/// Per-stage tuning constants. `None` fields are left out of the provider input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTuning {
    pub negative_prompt: Option<&'static str>,
    pub aspect_ratio: Option<AspectRatio>,
    pub image_size: Option<ImageSize>,
    pub num_frames: Option<u32>,
    pub frames_per_second: Option<u32>,
    pub resolution: Option<Resolution>,
    pub num_inference_steps: Option<u32>,
}

/// Path in the provider response that holds the produced media URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    /// `response.video.url`
    VideoUrl,
    /// `response.images[0].url`
    FirstImageUrl,
}

impl OutputField {
    fn pointer(&self) -> &'static str {
        match self {
            OutputField::VideoUrl => "/video/url",
            OutputField::FirstImageUrl => "/images/0/url",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            OutputField::VideoUrl => "video.url",
            OutputField::FirstImageUrl => "images[0].url",
        }
    }
}

/// Provider input as sent on the wire. Field order follows the provider docs.
#[derive(Debug, Serialize)]
struct StageInput<'a> {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_frames: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames_per_second: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_inference_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StageSpec {
    pub provider_id: &'static str,
    pub kind: StageKind,
    pub prompt: PromptSource,
    pub tuning: StageTuning,
    /// The provider input schema takes a `seed` field.
    pub accepts_seed: bool,
    pub output: OutputField,
    /// The provider response's `seed` becomes the pipeline's running seed.
    pub captures_seed: bool,
}

impl StageSpec {
    /// Builds the provider input from the request, the previous stage's
    /// artifact and the running seed.
    pub fn build_input(
        &self,
        request: &GenerationRequest,
        prior: Option<&ArtifactReference>,
        seed: Option<i64>,
    ) -> Result<Value, String> {
        let prior_url = if self.kind.needs_prior_artifact() {
            match prior {
                Some(artifact) => Some(artifact.url.as_str()),
                None => return Err(format!("{:?} stage has no input artifact", self.kind)),
            }
        } else {
            None
        };

        let prompt = match &self.prompt {
            PromptSource::User { style_suffix } if style_suffix.is_empty() => request.prompt.clone(),
            PromptSource::User { style_suffix } => format!("{}, {}", request.prompt, style_suffix),
            PromptSource::Fixed(text) => text.to_string(),
        };

        let input = StageInput {
            prompt,
            image_url: prior_url.filter(|_| self.kind == StageKind::ImageToVideo),
            video_url: prior_url.filter(|_| self.kind == StageKind::VideoToAudio),
            aspect_ratio: self.tuning.aspect_ratio,
            image_size: self.tuning.image_size,
            num_frames: self.tuning.num_frames,
            frames_per_second: self.tuning.frames_per_second,
            resolution: self.tuning.resolution,
            negative_prompt: self.tuning.negative_prompt,
            num_inference_steps: self.tuning.num_inference_steps,
            seed: seed.filter(|_| self.accepts_seed),
        };

        serde_json::to_value(&input).map_err(|e| format!("Failed to encode stage input: {}", e))
    }

    /// Pulls the artifact out of the provider response. A missing or empty URL
    /// is a failure, never an empty result.
    pub fn extract_output(&self, response: &Value) -> Result<ArtifactReference, String> {
        let url = response
            .pointer(self.output.pointer())
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                format!(
                    "Response did not contain a valid {}",
                    self.output.describe()
                )
            })?;

        let seed = if self.captures_seed {
            response.get("seed").and_then(Value::as_i64)
        } else {
            None
        };

        Ok(ArtifactReference {
            url: url.to_string(),
            seed,
        })
    }
}
