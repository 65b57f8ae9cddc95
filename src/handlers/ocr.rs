// src/handlers/ocr.rs
use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::ocr::{assemble_text, OcrPayload, OcrResult};
use crate::state::AppState;
use crate::utils::decode_image_payload;

/// POST /api/ocr - Extract the text lines from a base64 image
pub async fn extract_text(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<OcrPayload>, JsonRejection>,
) -> Result<Json<OcrResult>, ApiError> {
    let ocr = state.ocr.as_ref().ok_or_else(|| {
        ApiError::ServerMisconfigured(
            "AWS credentials (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION) are not configured"
                .to_string(),
        )
    })?;

    let Json(payload) = payload
        .map_err(|e| ApiError::InvalidInput(format!("Invalid JSON body: {}", e.body_text())))?;
    let image = payload
        .image_base64
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("No image provided.".to_string()))?;

    let bytes = decode_image_payload(&image)
        .map_err(|e| ApiError::InvalidInput(format!("Image is not valid base64: {}", e)))?;

    tracing::info!("📄 OCR request ({} bytes)", bytes.len());
    let blocks = ocr.detect_document_text(bytes).await?;

    Ok(Json(OcrResult {
        text: assemble_text(&blocks),
    }))
}
