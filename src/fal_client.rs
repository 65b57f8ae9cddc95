// src/fal_client.rs
// fal.ai queue API client: submit a job, poll its status, fetch the result

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::FalConfig;
use crate::error::ProviderError;
use crate::providers::GenerationProvider;

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct FalClient {
    client: Client,
    api_key: String,
    queue_url: String,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
pub struct QueueSubmission {
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
}

#[derive(Debug, Deserialize)]
pub struct QueueStatus {
    pub status: String,
    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub logs: Option<Vec<QueueLog>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueLog {
    pub message: String,
}

impl FalClient {
    pub fn new(config: &FalConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            queue_url: config.queue_url.clone(),
            poll_interval: config.poll_interval,
        }
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    /// Enqueue a job for `provider_id`
    pub async fn submit(&self, provider_id: &str, input: &Value) -> Result<QueueSubmission, ProviderError> {
        let response = self
            .client
            .post(format!("{}/{}", self.queue_url, provider_id))
            .header("Authorization", self.auth_header())
            .json(input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("fal.ai submit error ({}): {}", status, body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let submission = response.json::<QueueSubmission>().await?;
        info!("📤 Queued {} as request {}", provider_id, submission.request_id);
        Ok(submission)
    }

    /// Poll the job status until it completes. Pending states back off
    /// exponentially; the caller bounds the total wait.
    pub async fn wait_for_completion(&self, submission: &QueueSubmission) -> Result<(), ProviderError> {
        let policy = ExponentialBackoff {
            initial_interval: self.poll_interval,
            current_interval: self.poll_interval,
            max_interval: MAX_POLL_INTERVAL,
            multiplier: 1.5,
            max_elapsed_time: None,
            ..Default::default()
        };

        let operation = || async {
            let response = self
                .client
                .get(&submission.status_url)
                .header("Authorization", self.auth_header())
                .query(&[("logs", "1")])
                .send()
                .await
                .map_err(|e| {
                    // A dropped status poll does not touch the job itself
                    if e.is_connect() || e.is_timeout() {
                        backoff::Error::transient(ProviderError::Http(e))
                    } else {
                        backoff::Error::permanent(ProviderError::Http(e))
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(backoff::Error::permanent(ProviderError::Api {
                    status: status.as_u16(),
                    body,
                }));
            }

            let queue_status = response
                .json::<QueueStatus>()
                .await
                .map_err(|e| backoff::Error::permanent(ProviderError::Http(e)))?;

            if let Some(last) = queue_status.logs.as_ref().and_then(|logs| logs.last()) {
                debug!("fal.ai [{}] {}", submission.request_id, last.message);
            }

            match classify_status(&submission.request_id, &queue_status) {
                Ok(()) => Ok(()),
                Err(e @ ProviderError::Pending { .. }) => {
                    debug!(
                        "⏳ Request {} {} (queue position: {:?})",
                        submission.request_id, queue_status.status, queue_status.queue_position
                    );
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        };

        retry(policy, operation).await
    }

    /// Fetch the finished job's output
    pub async fn fetch_result(&self, submission: &QueueSubmission) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(&submission.response_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("fal.ai result error ({}): {}", status, body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// `Ok` once the job completed cleanly, `Pending` while it is queued or running.
fn classify_status(request_id: &str, status: &QueueStatus) -> Result<(), ProviderError> {
    match status.status.as_str() {
        "COMPLETED" => match &status.error {
            Some(message) => Err(ProviderError::JobFailed(message.clone())),
            None => Ok(()),
        },
        "IN_QUEUE" | "IN_PROGRESS" => Err(ProviderError::Pending {
            request_id: request_id.to_string(),
            status: status.status.clone(),
        }),
        other => Err(ProviderError::InvalidResponse(format!(
            "unknown queue status '{}' for request {}",
            other, request_id
        ))),
    }
}

#[async_trait]
impl GenerationProvider for FalClient {
    async fn run(&self, provider_id: &str, input: Value) -> Result<Value, ProviderError> {
        let submission = self.submit(provider_id, &input).await?;
        self.wait_for_completion(&submission).await?;
        let result = self.fetch_result(&submission).await?;
        info!("✅ {} finished (request {})", provider_id, submission.request_id);
        Ok(result)
    }
}
