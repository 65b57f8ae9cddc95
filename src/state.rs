// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::fal_client::FalClient;
use crate::pipeline::{ExecutorConfig, PipelineExecutor};
use crate::providers::{GenerationProvider, OcrProvider};
use crate::textract_client::TextractClient;

// AppState holds the provider clients. A `None` client means its credentials
// were not configured and the endpoints backed by it answer 500.
pub struct AppState {
    pub executor: Option<PipelineExecutor>,
    pub ocr: Option<Arc<dyn OcrProvider>>,
}

impl AppState {
    pub fn new(
        generation: Option<Arc<dyn GenerationProvider>>,
        ocr: Option<Arc<dyn OcrProvider>>,
        stage_timeout: Duration,
    ) -> Self {
        let executor = generation
            .map(|provider| PipelineExecutor::new(provider, ExecutorConfig { stage_timeout }));
        Self { executor, ocr }
    }

    /// Build the real provider clients from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let generation = match &config.fal {
            Some(fal) => {
                tracing::info!("Initializing fal.ai queue client ({})...", fal.queue_url);
                Some(Arc::new(FalClient::new(fal)) as Arc<dyn GenerationProvider>)
            }
            None => {
                tracing::warn!("FAL_API_KEY not found. Generation endpoints will answer 500.");
                tracing::info!("To enable generation, set: FAL_API_KEY");
                None
            }
        };

        let ocr = match &config.aws {
            Some(aws) => {
                tracing::info!("Initializing AWS Textract client ({})...", aws.region);
                Some(Arc::new(TextractClient::new(aws.clone())) as Arc<dyn OcrProvider>)
            }
            None => {
                tracing::warn!("AWS credentials not found. OCR endpoint will answer 500.");
                tracing::info!("To enable OCR, set: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_REGION");
                None
            }
        };

        Self::new(generation, ocr, config.stage_timeout)
    }
}
