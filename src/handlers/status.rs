// src/handlers/status.rs
use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::pipeline::PipelineVariant;
use crate::state::AppState;

/// GET /api/status - Provider configuration and the pipelines each endpoint runs
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let generation_status = if state.executor.is_some() { "configured" } else { "not_configured" };
    let ocr_status = if state.ocr.is_some() { "configured" } else { "not_configured" };

    let pipelines: Vec<Value> = PipelineVariant::ALL
        .iter()
        .map(|variant| {
            let definition = variant.definition();
            json!({
                "variant": variant,
                "endpoint": variant.endpoint(),
                "output": definition.output,
                "stages": definition.provider_ids(),
            })
        })
        .collect();

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "generation": generation_status,
            "ocr": ocr_status
        },
        "pipelines": pipelines,
        "endpoints": {
            "status": "/api/status",
            "ocr": "/api/ocr"
        }
    }))
}
