// src/handlers/mod.rs
pub mod generation;
pub mod ocr;
pub mod status;

use axum::{
    handler::Handler,
    http::StatusCode,
    routing::{get, post, MethodRouter},
    Router,
};

use crate::error::ApiError;
use crate::pipeline::PipelineVariant;

/// POST-only route: OPTIONS answers the CORS preflight with an empty 200,
/// every other verb gets a JSON 405.
fn post_only<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T, ()>,
    T: 'static,
{
    post(handler).options(preflight).fallback(method_not_allowed)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Routes for the generation pipelines
pub fn generation_routes() -> Router {
    use generation::*;

    Router::new()
        .route(
            PipelineVariant::VideoWithAudio.endpoint(),
            post_only(generate_video_with_audio),
        )
        .route(PipelineVariant::ImageOnly.endpoint(), post_only(generate_image))
        .route(PipelineVariant::VideoOnly.endpoint(), post_only(generate_video))
        .route(
            PipelineVariant::VideoFromImage.endpoint(),
            post_only(generate_video_from_image),
        )
        .route(
            PipelineVariant::AnimatedVideoWithAudio.endpoint(),
            post_only(generate_animated_video_with_audio),
        )
}

pub fn ocr_routes() -> Router {
    Router::new().route("/api/ocr", post_only(ocr::extract_text))
}

pub fn status_routes() -> Router {
    Router::new().route(
        "/api/status",
        get(status::api_status).fallback(method_not_allowed),
    )
}
