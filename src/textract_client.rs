// src/textract_client.rs
// AWS Textract client (DetectDocumentText) with Signature V4 request signing

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::config::AwsConfig;
use crate::error::ProviderError;
use crate::models::ocr::TextBlock;
use crate::providers::OcrProvider;

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "textract";
const TARGET: &str = "Textract.DetectDocumentText";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Clone)]
pub struct TextractClient {
    client: Client,
    credentials: AwsConfig,
    endpoint: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DetectDocumentTextRequest {
    document: Document,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Document {
    bytes: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DetectDocumentTextResponse {
    #[serde(default)]
    blocks: Vec<TextBlock>,
}

impl TextractClient {
    pub fn new(credentials: AwsConfig) -> Self {
        let endpoint = format!("https://textract.{}.amazonaws.com", credentials.region);
        Self {
            client: Client::new(),
            credentials,
            endpoint,
        }
    }

    fn host(&self) -> &str {
        self.endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
    }
}

#[async_trait]
impl OcrProvider for TextractClient {
    async fn detect_document_text(&self, image: Vec<u8>) -> Result<Vec<TextBlock>, ProviderError> {
        let body = serde_json::to_vec(&DetectDocumentTextRequest {
            document: Document {
                bytes: BASE64_STANDARD.encode(&image),
            },
        })
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to encode request: {}", e)))?;

        info!("🔎 Sending {} bytes to Textract ({})", image.len(), self.credentials.region);

        let signed = sign_request(
            &self.credentials,
            &SigningRequest {
                method: "POST",
                host: self.host(),
                path: "/",
                service: SERVICE,
                headers: &[("Content-Type", CONTENT_TYPE), ("X-Amz-Target", TARGET)],
                body: &body,
            },
            Utc::now(),
        );

        let mut request = self
            .client
            .post(format!("{}/", self.endpoint))
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", TARGET)
            .header("X-Amz-Date", &signed.amz_date)
            .header("Authorization", &signed.authorization);
        if let Some(token) = &self.credentials.session_token {
            request = request.header("X-Amz-Security-Token", token);
        }

        let response = request.body(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Textract API error ({}): {}", status, body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<DetectDocumentTextResponse>().await?;
        info!("✅ Textract returned {} blocks", parsed.blocks.len());
        Ok(parsed.blocks)
    }
}

struct SignedHeaders {
    amz_date: String,
    authorization: String,
}

/// The parts of an HTTP request that Signature V4 covers. `host`, `x-amz-date`
/// and the session token are added by the signer.
struct SigningRequest<'a> {
    method: &'a str,
    host: &'a str,
    path: &'a str,
    service: &'a str,
    headers: &'a [(&'a str, &'a str)],
    body: &'a [u8],
}

/// AWS Signature V4 (header-based, no query string).
fn sign_request(
    credentials: &AwsConfig,
    request: &SigningRequest<'_>,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    headers.push(("host".to_string(), request.host.to_string()));
    headers.push(("x-amz-date".to_string(), amz_date.clone()));
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.trim().to_string()));
    }
    // Canonical headers must be sorted by lowercase name
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        request.method,
        request.path,
        canonical_headers,
        signed_headers,
        hex::encode(Sha256::digest(request.body))
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date, credentials.region, request.service
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(
        &credentials.secret_access_key,
        &date,
        &credentials.region,
        request.service,
    );
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    SignedHeaders {
        authorization: format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            credentials.access_key_id, scope, signed_headers, signature
        ),
        amz_date,
    }
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
