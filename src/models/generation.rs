// src/models/generation.rs
use serde::{Deserialize, Serialize};

/// Inbound body of every generation endpoint. Both fields are optional at the
/// wire level so a missing prompt surfaces as a validation error, not a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationPayload {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
}

/// A validated generation request. Immutable for the lifetime of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub seed: Option<i64>,
}

impl GenerationRequest {
    /// Returns `None` when the prompt is absent or blank.
    pub fn from_payload(payload: GenerationPayload) -> Option<Self> {
        let prompt = payload.prompt?;
        if prompt.trim().is_empty() {
            return None;
        }
        Some(Self {
            prompt,
            seed: payload.seed,
        })
    }
}

/// Reference to a provider-produced media object plus the seed that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactReference {
    pub url: String,
    pub seed: Option<i64>,
}

/// Which response field carries the final artifact URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Image,
    Video,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GenerationResponse {
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub seed: Option<i64>,
}

impl GenerationResponse {
    pub fn new(kind: ArtifactKind, artifact: ArtifactReference, seed: Option<i64>) -> Self {
        match kind {
            ArtifactKind::Image => Self {
                video_url: None,
                image_url: Some(artifact.url),
                seed,
            },
            ArtifactKind::Video => Self {
                video_url: Some(artifact.url),
                image_url: None,
                seed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_prompt_is_rejected() {
        let payload = GenerationPayload {
            prompt: Some("   ".to_string()),
            seed: Some(3),
        };
        assert!(GenerationRequest::from_payload(payload).is_none());
        assert!(GenerationRequest::from_payload(GenerationPayload::default()).is_none());
    }

    #[test]
    fn test_payload_accepts_missing_seed() {
        let payload: GenerationPayload = serde_json::from_value(json!({ "prompt": "a castle" })).unwrap();
        let request = GenerationRequest::from_payload(payload).unwrap();
        assert_eq!(request.prompt, "a castle");
        assert_eq!(request.seed, None);
    }

    #[test]
    fn test_response_uses_camel_case_url_field() {
        let artifact = ArtifactReference {
            url: "img1".to_string(),
            seed: Some(7),
        };
        let body = serde_json::to_value(GenerationResponse::new(ArtifactKind::Image, artifact, Some(7))).unwrap();
        assert_eq!(body, json!({ "imageUrl": "img1", "seed": 7 }));
    }
}
