// src/handlers/generation.rs
//! Generation endpoints. Each one is a thin binding of a single pipeline variant.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::generation::{GenerationPayload, GenerationRequest, GenerationResponse};
use crate::pipeline::PipelineVariant;
use crate::state::AppState;

type GenerationResult = Result<Json<GenerationResponse>, ApiError>;

/// Validate the request, run the variant's pipeline and shape the response.
/// Credentials are checked before the body so a misconfigured server never
/// looks like a client error.
pub async fn run_generation(
    variant: PipelineVariant,
    state: &AppState,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    let executor = state.executor.as_ref().ok_or_else(|| {
        ApiError::ServerMisconfigured("fal.ai API key (FAL_API_KEY) is not configured".to_string())
    })?;

    let Json(payload) = payload
        .map_err(|e| ApiError::InvalidInput(format!("Invalid JSON body: {}", e.body_text())))?;
    let request = GenerationRequest::from_payload(payload)
        .ok_or_else(|| ApiError::InvalidInput("No prompt provided.".to_string()))?;

    let definition = variant.definition();
    tracing::info!(
        "🎬 {} request (seed: {:?}, prompt length: {})",
        definition.name(),
        request.seed,
        request.prompt.len()
    );

    let outcome = executor.run(definition, &request).await?;

    Ok(Json(GenerationResponse::new(
        definition.output,
        outcome.artifact,
        outcome.seed,
    )))
}

/// POST /api/generate-video-with-audio
pub async fn generate_video_with_audio(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    run_generation(PipelineVariant::VideoWithAudio, &state, payload).await
}

/// POST /api/generate-image
pub async fn generate_image(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    run_generation(PipelineVariant::ImageOnly, &state, payload).await
}

/// POST /api/generate-video
pub async fn generate_video(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    run_generation(PipelineVariant::VideoOnly, &state, payload).await
}

/// POST /api/generate-video-from-image
pub async fn generate_video_from_image(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    run_generation(PipelineVariant::VideoFromImage, &state, payload).await
}

/// POST /api/generate-animated-video-with-audio
pub async fn generate_animated_video_with_audio(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GenerationPayload>, JsonRejection>,
) -> GenerationResult {
    run_generation(PipelineVariant::AnimatedVideoWithAudio, &state, payload).await
}
