// src/pipeline/executor.rs
// Executor - Runs a pipeline definition stage by stage, threading seed and artifact
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{error, info};

use super::definitions::PipelineDefinition;
use super::stage::StageSpec;
use crate::error::PipelineError;
use crate::models::generation::{ArtifactReference, GenerationRequest};
use crate::providers::GenerationProvider;

/// Pipeline executor config
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub stage_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(600),
        }
    }
}

/// Result of a successful run: the last stage's artifact and the running seed.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub artifact: ArtifactReference,
    pub seed: Option<i64>,
}

pub struct PipelineExecutor {
    provider: Arc<dyn GenerationProvider>,
    config: ExecutorConfig,
}

impl PipelineExecutor {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: ExecutorConfig) -> Self {
        Self { provider, config }
    }

    /// Run the pipeline to completion. The first failing stage aborts the run;
    /// nothing produced before it is returned.
    pub async fn run(
        &self,
        definition: &PipelineDefinition,
        request: &GenerationRequest,
    ) -> Result<PipelineOutcome, PipelineError> {
        info!(
            "🚀 Starting pipeline {} ({} stages)",
            definition.name(),
            definition.stages.len()
        );
        let started = Instant::now();

        let mut current: Option<ArtifactReference> = None;
        let mut seed = request.seed;

        for (index, stage) in definition.stages.iter().enumerate() {
            info!(
                "📍 Stage {}/{}: {} (seed: {:?})",
                index + 1,
                definition.stages.len(),
                stage.provider_id,
                seed
            );

            let artifact = match self.execute_stage(stage, request, current.as_ref(), seed).await {
                Ok(artifact) => artifact,
                Err(e) => {
                    error!("❌ Pipeline {} aborted at stage {}: {}", definition.name(), index + 1, e);
                    return Err(e);
                }
            };

            if let Some(stage_seed) = artifact.seed {
                seed = Some(stage_seed);
            }
            current = Some(artifact);
        }

        let artifact = current.ok_or_else(|| PipelineError::EmptyPipeline(definition.name()))?;

        info!(
            "✅ Pipeline {} finished in {}ms (seed: {:?})",
            definition.name(),
            started.elapsed().as_millis(),
            seed
        );

        Ok(PipelineOutcome { artifact, seed })
    }

    /// Execute one stage with the configured timeout
    async fn execute_stage(
        &self,
        stage: &StageSpec,
        request: &GenerationRequest,
        prior: Option<&ArtifactReference>,
        seed: Option<i64>,
    ) -> Result<ArtifactReference, PipelineError> {
        let input = stage
            .build_input(request, prior, seed)
            .map_err(|reason| PipelineError::stage(stage.provider_id, reason))?;

        let response = match timeout(
            self.config.stage_timeout,
            self.provider.run(stage.provider_id, input),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(PipelineError::stage(stage.provider_id, e.to_string())),
            Err(_) => {
                return Err(PipelineError::stage(
                    stage.provider_id,
                    format!("timed out after {}s", self.config.stage_timeout.as_secs_f64()),
                ))
            }
        };

        stage
            .extract_output(&response)
            .map_err(|reason| PipelineError::stage(stage.provider_id, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::pipeline::definitions::{
        PipelineVariant, IMAGE_TO_VIDEO_MODEL, TEXT_TO_IMAGE_MODEL, TEXT_TO_VIDEO_MODEL,
        VIDEO_TO_AUDIO_MODEL,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers each provider id with a canned response and records every call.
    #[derive(Default)]
    struct ScriptedProvider {
        responses: HashMap<&'static str, Value>,
        failures: HashMap<&'static str, String>,
        delay: Option<Duration>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedProvider {
        fn respond(mut self, provider_id: &'static str, response: Value) -> Self {
            self.responses.insert(provider_id, response);
            self
        }

        fn fail(mut self, provider_id: &'static str, message: &str) -> Self {
            self.failures.insert(provider_id, message.to_string());
            self
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn run(&self, provider_id: &str, input: Value) -> Result<Value, ProviderError> {
            self.calls.lock().unwrap().push((provider_id.to_string(), input));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = self.failures.get(provider_id) {
                return Err(ProviderError::JobFailed(message.clone()));
            }
            Ok(self.responses.get(provider_id).cloned().unwrap_or(Value::Null))
        }
    }

    fn executor(provider: Arc<ScriptedProvider>) -> PipelineExecutor {
        PipelineExecutor::new(provider, ExecutorConfig::default())
    }

    fn request(seed: Option<i64>) -> GenerationRequest {
        GenerationRequest {
            prompt: "a castle".to_string(),
            seed,
        }
    }

    #[tokio::test]
    async fn test_seed_comes_from_first_stage_when_omitted() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .respond(TEXT_TO_VIDEO_MODEL, json!({ "video": { "url": "u1" }, "seed": 42 }))
                .respond(VIDEO_TO_AUDIO_MODEL, json!({ "video": { "url": "u2" } })),
        );

        let outcome = executor(provider.clone())
            .run(PipelineVariant::VideoWithAudio.definition(), &request(None))
            .await
            .unwrap();

        assert_eq!(outcome.artifact.url, "u2");
        assert_eq!(outcome.seed, Some(42));

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.get("seed").is_none());
        assert_eq!(calls[1].1["video_url"], "u1");
    }

    #[tokio::test]
    async fn test_client_seed_is_reused_across_stages() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .respond(TEXT_TO_IMAGE_MODEL, json!({ "images": [{ "url": "img1" }], "seed": 7 }))
                .respond(IMAGE_TO_VIDEO_MODEL, json!({ "video": { "url": "v1" }, "seed": 7 }))
                .respond(VIDEO_TO_AUDIO_MODEL, json!({ "video": { "url": "v2" } })),
        );

        let outcome = executor(provider.clone())
            .run(PipelineVariant::AnimatedVideoWithAudio.definition(), &request(Some(7)))
            .await
            .unwrap();

        assert_eq!(outcome, PipelineOutcome {
            artifact: ArtifactReference { url: "v2".to_string(), seed: None },
            seed: Some(7),
        });

        let calls = provider.calls();
        assert_eq!(calls[0].1["seed"], 7);
        assert_eq!(calls[1].1["seed"], 7);
        assert_eq!(calls[1].1["image_url"], "img1");
        assert!(calls[2].1.get("seed").is_none());
    }

    #[tokio::test]
    async fn test_video_from_image_forwards_client_seed_to_animation() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .respond(TEXT_TO_IMAGE_MODEL, json!({ "images": [{ "url": "img1" }], "seed": 7 }))
                .respond(IMAGE_TO_VIDEO_MODEL, json!({ "video": { "url": "v1" }, "seed": 999 })),
        );

        let outcome = executor(provider.clone())
            .run(PipelineVariant::VideoFromImage.definition(), &request(Some(7)))
            .await
            .unwrap();

        let calls = provider.calls();
        assert_eq!(calls[1].0, IMAGE_TO_VIDEO_MODEL);
        assert_eq!(calls[1].1["seed"], 7);
        assert_eq!(outcome.artifact.url, "v1");
        assert_eq!(outcome.seed, Some(7));
    }

    #[tokio::test]
    async fn test_provider_seed_replaces_client_seed_downstream() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .respond(TEXT_TO_IMAGE_MODEL, json!({ "images": [{ "url": "img1" }], "seed": 11 }))
                .respond(IMAGE_TO_VIDEO_MODEL, json!({ "video": { "url": "v1" } }))
                .respond(VIDEO_TO_AUDIO_MODEL, json!({ "video": { "url": "v2" } })),
        );

        let outcome = executor(provider.clone())
            .run(PipelineVariant::AnimatedVideoWithAudio.definition(), &request(None))
            .await
            .unwrap();

        assert_eq!(outcome.seed, Some(11));
        assert_eq!(provider.calls()[1].1["seed"], 11);
    }

    #[tokio::test]
    async fn test_first_stage_failure_short_circuits() {
        for variant in PipelineVariant::ALL {
            let definition = variant.definition();
            let first = definition.stages[0].provider_id;
            let provider = Arc::new(ScriptedProvider::default().fail(first, "quota exceeded"));

            let err = executor(provider.clone())
                .run(definition, &request(None))
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::StageFailure { ref provider_id, .. } if provider_id == first));
            assert_eq!(provider.calls().len(), 1, "{:?} ran past a failed stage", variant);
        }
    }

    #[tokio::test]
    async fn test_missing_url_fails_stage() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .respond(TEXT_TO_VIDEO_MODEL, json!({ "video": { "url": "u1" }, "seed": 1 }))
                .respond(VIDEO_TO_AUDIO_MODEL, json!({ "detail": "ok" })),
        );

        let err = executor(provider.clone())
            .run(PipelineVariant::VideoWithAudio.definition(), &request(None))
            .await
            .unwrap_err();

        match err {
            PipelineError::StageFailure { provider_id, reason } => {
                assert_eq!(provider_id, VIDEO_TO_AUDIO_MODEL);
                assert!(reason.contains("video.url"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stage_timeout_is_a_stage_failure() {
        let provider = Arc::new(ScriptedProvider {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let executor = PipelineExecutor::new(
            provider.clone(),
            ExecutorConfig {
                stage_timeout: Duration::from_millis(20),
            },
        );

        let err = executor
            .run(PipelineVariant::VideoFromImage.definition(), &request(None))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_definition_is_rejected() {
        let definition = PipelineDefinition {
            variant: PipelineVariant::ImageOnly,
            stages: Vec::new(),
            output: crate::models::generation::ArtifactKind::Image,
        };
        let provider = Arc::new(ScriptedProvider::default());

        let err = executor(provider).run(&definition, &request(None)).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyPipeline(_)));
    }
}
