// lib.rs - Media generation gateway: pipeline orchestration over hosted inference providers
pub mod config;
pub mod error;
pub mod fal_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod state;
pub mod textract_client;
pub mod utils;

use axum::{
    http::{header, Method},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use error::{ApiError, PipelineError, ProviderError};
pub use state::AppState;

/// Build the application router with all routes and shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(handlers::generation_routes())
        .merge(handlers::ocr_routes())
        .merge(handlers::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(cors)
        .layer(Extension(state))
}
