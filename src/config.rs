// src/config.rs
//! Process configuration, read once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_FAL_QUEUE_URL: &str = "https://queue.fal.run";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct FalConfig {
    pub api_key: String,
    pub queue_url: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
}

/// Missing credentials are not an error here: the affected endpoints answer
/// 500 until they are provided.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub stage_timeout: Duration,
    pub fal: Option<FalConfig>,
    pub aws: Option<AwsConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let stage_timeout = Duration::from_secs(parse_u64(
            get("STAGE_TIMEOUT_SECS"),
            "STAGE_TIMEOUT_SECS",
            DEFAULT_STAGE_TIMEOUT_SECS,
        )?);
        let poll_interval = Duration::from_millis(parse_u64(
            get("FAL_POLL_INTERVAL_MS"),
            "FAL_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        )?);

        let fal = get("FAL_API_KEY")
            .or_else(|| get("FAL_KEY"))
            .map(|api_key| FalConfig {
                api_key,
                queue_url: get("FAL_QUEUE_URL")
                    .unwrap_or_else(|| DEFAULT_FAL_QUEUE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                poll_interval,
            });

        let aws = match (
            get("AWS_ACCESS_KEY_ID"),
            get("AWS_SECRET_ACCESS_KEY"),
            get("AWS_REGION"),
        ) {
            (Some(access_key_id), Some(secret_access_key), Some(region)) => Some(AwsConfig {
                access_key_id,
                secret_access_key,
                session_token: get("AWS_SESSION_TOKEN"),
                region,
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            stage_timeout,
            fal,
            aws,
        })
    }
}

fn parse_u64(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
    }
}
