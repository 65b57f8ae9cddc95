// src/providers.rs
//! Seams to the external inference and OCR services.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::models::ocr::TextBlock;

/// A hosted generative model endpoint. `provider_id` names the model
/// (e.g. `fal-ai/mmaudio-v2`); input and output are the provider's own JSON.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn run(&self, provider_id: &str, input: Value) -> Result<Value, ProviderError>;
}

/// A hosted document OCR endpoint.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn detect_document_text(&self, image: Vec<u8>) -> Result<Vec<TextBlock>, ProviderError>;
}
