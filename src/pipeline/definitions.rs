// src/pipeline/definitions.rs
//! The five product pipelines. Every tuning literal the products depend on lives here.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

use super::stage::{
    AspectRatio, ImageSize, OutputField, PromptSource, Resolution, StageKind, StageSpec,
    StageTuning,
};
use crate::models::generation::ArtifactKind;

pub const TEXT_TO_IMAGE_MODEL: &str = "fal-ai/flux/dev";
pub const TEXT_TO_VIDEO_MODEL: &str = "fal-ai/wan/v2.2-5b/text-to-video";
pub const IMAGE_TO_VIDEO_MODEL: &str = "fal-ai/wan/v2.2-5b/image-to-video";
pub const VIDEO_TO_AUDIO_MODEL: &str = "fal-ai/mmaudio-v2";

pub const NEGATIVE_PROMPT: &str =
    "distorted face, deformed hands, ugly, blurry, low quality, disfigured, deformed";
const ILLUSTRATION_STYLE: &str =
    "cinematic, beautiful, book illustration, hyperrealistic, 4k, detailed";
const IMAGE_STYLE: &str = "book illustration, highly detailed, sharp focus, vibrant colors, 4k";
const VIDEO_STYLE: &str = "cinematic, beautiful, hyperrealistic, smooth motion, 4k, detailed";
const ANIMATION_STYLE: &str = "gentle camera movement, cinematic lighting, smooth animation";
const AMBIENT_SOUNDTRACK: &str = "gentle ambient music, cinematic score";

/// One product variant, bound to exactly one HTTP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// text→video → video→audio
    VideoWithAudio,
    /// text→image
    ImageOnly,
    /// text→video
    VideoOnly,
    /// text→image → image→video
    VideoFromImage,
    /// text→image → image→video → video→audio
    AnimatedVideoWithAudio,
}

impl PipelineVariant {
    pub const ALL: [PipelineVariant; 5] = [
        PipelineVariant::VideoWithAudio,
        PipelineVariant::ImageOnly,
        PipelineVariant::VideoOnly,
        PipelineVariant::VideoFromImage,
        PipelineVariant::AnimatedVideoWithAudio,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            PipelineVariant::VideoWithAudio => "/api/generate-video-with-audio",
            PipelineVariant::ImageOnly => "/api/generate-image",
            PipelineVariant::VideoOnly => "/api/generate-video",
            PipelineVariant::VideoFromImage => "/api/generate-video-from-image",
            PipelineVariant::AnimatedVideoWithAudio => "/api/generate-animated-video-with-audio",
        }
    }

    pub fn definition(&self) -> &'static PipelineDefinition {
        &CATALOG[self]
    }
}

#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    pub variant: PipelineVariant,
    pub stages: Vec<StageSpec>,
    pub output: ArtifactKind,
}

impl PipelineDefinition {
    pub fn name(&self) -> String {
        format!("{:?}", self.variant)
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.provider_id).collect()
    }
}

lazy_static! {
    static ref CATALOG: HashMap<PipelineVariant, PipelineDefinition> = PipelineVariant::ALL
        .iter()
        .map(|variant| (*variant, build(*variant)))
        .collect();
}

fn build(variant: PipelineVariant) -> PipelineDefinition {
    let (stages, output) = match variant {
        PipelineVariant::VideoWithAudio => (
            vec![
                text_to_video(ILLUSTRATION_STYLE, 50),
                video_to_audio(),
            ],
            ArtifactKind::Video,
        ),
        PipelineVariant::ImageOnly => (
            vec![text_to_image(IMAGE_STYLE, ImageSize::Landscape16x9)],
            ArtifactKind::Image,
        ),
        PipelineVariant::VideoOnly => (
            vec![text_to_video(VIDEO_STYLE, 40)],
            ArtifactKind::Video,
        ),
        PipelineVariant::VideoFromImage => (
            vec![
                text_to_image(IMAGE_STYLE, ImageSize::Landscape16x9),
                image_to_video(AspectRatio::Landscape),
            ],
            ArtifactKind::Video,
        ),
        PipelineVariant::AnimatedVideoWithAudio => (
            vec![
                text_to_image(ILLUSTRATION_STYLE, ImageSize::Portrait16x9),
                image_to_video(AspectRatio::Portrait),
                video_to_audio(),
            ],
            ArtifactKind::Video,
        ),
    };

    PipelineDefinition {
        variant,
        stages,
        output,
    }
}

fn text_to_image(style_suffix: &'static str, image_size: ImageSize) -> StageSpec {
    StageSpec {
        provider_id: TEXT_TO_IMAGE_MODEL,
        kind: StageKind::TextToImage,
        prompt: PromptSource::User { style_suffix },
        tuning: StageTuning {
            negative_prompt: Some(NEGATIVE_PROMPT),
            image_size: Some(image_size),
            num_inference_steps: Some(28),
            ..Default::default()
        },
        accepts_seed: true,
        output: OutputField::FirstImageUrl,
        captures_seed: true,
    }
}

fn text_to_video(style_suffix: &'static str, num_inference_steps: u32) -> StageSpec {
    StageSpec {
        provider_id: TEXT_TO_VIDEO_MODEL,
        kind: StageKind::TextToVideo,
        prompt: PromptSource::User { style_suffix },
        tuning: StageTuning {
            negative_prompt: Some(NEGATIVE_PROMPT),
            aspect_ratio: Some(AspectRatio::Landscape),
            // 5 seconds at 24 fps
            num_frames: Some(121),
            frames_per_second: Some(24),
            resolution: Some(Resolution::P720),
            num_inference_steps: Some(num_inference_steps),
            ..Default::default()
        },
        accepts_seed: true,
        output: OutputField::VideoUrl,
        captures_seed: true,
    }
}

fn image_to_video(aspect_ratio: AspectRatio) -> StageSpec {
    StageSpec {
        provider_id: IMAGE_TO_VIDEO_MODEL,
        kind: StageKind::ImageToVideo,
        prompt: PromptSource::User {
            style_suffix: ANIMATION_STYLE,
        },
        tuning: StageTuning {
            negative_prompt: Some(NEGATIVE_PROMPT),
            aspect_ratio: Some(aspect_ratio),
            num_frames: Some(121),
            frames_per_second: Some(24),
            resolution: Some(Resolution::P720),
            num_inference_steps: Some(40),
            ..Default::default()
        },
        accepts_seed: true,
        output: OutputField::VideoUrl,
        captures_seed: false,
    }
}

fn video_to_audio() -> StageSpec {
    StageSpec {
        provider_id: VIDEO_TO_AUDIO_MODEL,
        kind: StageKind::VideoToAudio,
        prompt: PromptSource::Fixed(AMBIENT_SOUNDTRACK),
        tuning: StageTuning::default(),
        accepts_seed: false,
        output: OutputField::VideoUrl,
        captures_seed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::generation::GenerationRequest;
    use serde_json::json;

    #[test]
    fn test_stage_sequences() {
        use PipelineVariant::*;
        assert_eq!(
            VideoWithAudio.definition().provider_ids(),
            vec![TEXT_TO_VIDEO_MODEL, VIDEO_TO_AUDIO_MODEL]
        );
        assert_eq!(ImageOnly.definition().provider_ids(), vec![TEXT_TO_IMAGE_MODEL]);
        assert_eq!(VideoOnly.definition().provider_ids(), vec![TEXT_TO_VIDEO_MODEL]);
        assert_eq!(
            VideoFromImage.definition().provider_ids(),
            vec![TEXT_TO_IMAGE_MODEL, IMAGE_TO_VIDEO_MODEL]
        );
        assert_eq!(
            AnimatedVideoWithAudio.definition().provider_ids(),
            vec![TEXT_TO_IMAGE_MODEL, IMAGE_TO_VIDEO_MODEL, VIDEO_TO_AUDIO_MODEL]
        );
    }

    #[test]
    fn test_output_kinds() {
        assert_eq!(PipelineVariant::ImageOnly.definition().output, ArtifactKind::Image);
        for variant in PipelineVariant::ALL {
            if variant != PipelineVariant::ImageOnly {
                assert_eq!(variant.definition().output, ArtifactKind::Video);
            }
        }
    }

    #[test]
    fn test_video_with_audio_first_stage_input_is_verbatim() {
        let request = GenerationRequest {
            prompt: "a castle".to_string(),
            seed: Some(42),
        };
        let stage = &PipelineVariant::VideoWithAudio.definition().stages[0];
        let input = stage.build_input(&request, None, request.seed).unwrap();
        assert_eq!(
            input,
            json!({
                "prompt": "a castle, cinematic, beautiful, book illustration, hyperrealistic, 4k, detailed",
                "aspect_ratio": "16:9",
                "num_frames": 121,
                "frames_per_second": 24,
                "resolution": "720p",
                "negative_prompt": "distorted face, deformed hands, ugly, blurry, low quality, disfigured, deformed",
                "num_inference_steps": 50,
                "seed": 42
            })
        );
    }

    #[test]
    fn test_audio_stage_uses_fixed_prompt() {
        let request = GenerationRequest {
            prompt: "a castle".to_string(),
            seed: None,
        };
        let prior = crate::models::generation::ArtifactReference {
            url: "u1".to_string(),
            seed: Some(42),
        };
        let stage = &PipelineVariant::VideoWithAudio.definition().stages[1];
        let input = stage.build_input(&request, Some(&prior), Some(42)).unwrap();
        assert_eq!(
            input,
            json!({ "prompt": "gentle ambient music, cinematic score", "video_url": "u1" })
        );
    }

    #[test]
    fn test_every_image_to_video_stage_accepts_seed() {
        for variant in [PipelineVariant::VideoFromImage, PipelineVariant::AnimatedVideoWithAudio] {
            let stage = &variant.definition().stages[1];
            assert_eq!(stage.kind, StageKind::ImageToVideo);
            assert!(stage.accepts_seed, "{:?}", variant);
            assert!(!stage.captures_seed, "{:?}", variant);
        }
    }

    #[test]
    fn test_endpoints_are_unique() {
        let mut endpoints: Vec<_> = PipelineVariant::ALL.iter().map(|v| v.endpoint()).collect();
        endpoints.sort();
        endpoints.dedup();
        assert_eq!(endpoints.len(), PipelineVariant::ALL.len());
    }
}
