//! C3 - Render Engine.
//!
//! Calls a selected provider with a prompt, parses its image response,
//! and classifies the outcome as success or failure. Never panics on a
//! malformed response - every failure mode in §4.3 degrades to a plain
//! `RenderFailure`, which the caller (the Dedup & Retry Coordinator)
//! turns into a `failureCount` increment, never a surfaced error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::provider_pool::ProviderEntry;
use scenesmith_domain::Prompts;

/// The image a provider returned, before it's folded into `Assets` (which
/// additionally carries the provider label and model name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderCallError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned an error status: {0}")]
    Status(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderFailure {
    #[error("provider call failed: {0}")]
    Call(#[from] ProviderCallError),
    #[error("render timed out")]
    Timeout,
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Transport for a single provider call. Implementations own the HTTP
/// client; the render engine owns the timeout and response parsing.
#[async_trait]
pub trait ImageProviderClient: Send + Sync {
    async fn generate(
        &self,
        entry: &ProviderEntry,
        prompts: &Prompts,
    ) -> Result<Value, ProviderCallError>;
}

/// Generic HTTP client for the single supported provider kind (§3): a
/// JSON POST carrying `{prompt, negativePrompt, imageSize, numImages}`,
/// authorized with the provider's API key.
pub struct HttpImageProviderClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpImageProviderClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ImageProviderClient for HttpImageProviderClient {
    async fn generate(
        &self,
        entry: &ProviderEntry,
        prompts: &Prompts,
    ) -> Result<Value, ProviderCallError> {
        let body = serde_json::json!({
            "prompt": prompts.base,
            "negativePrompt": prompts.negative,
            "imageSize": {
                "width": entry.resolution.width,
                "height": entry.resolution.height,
            },
            "numImages": 1,
            "model": entry.model,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&entry.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderCallError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderCallError::Status(format!("{status}: {text}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderCallError::Network(e.to_string()))
    }
}

/// Wraps a transport with the configured render timeout and response
/// parsing (§4.3, §5 timeouts).
pub struct RenderEngine {
    client: Arc<dyn ImageProviderClient>,
    timeout: Duration,
}

impl RenderEngine {
    pub fn new(client: Arc<dyn ImageProviderClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn attempt(
        &self,
        entry: &ProviderEntry,
        prompts: &Prompts,
    ) -> Result<ProviderImage, RenderFailure> {
        let call = self.client.generate(entry, prompts);
        let value = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => return Err(RenderFailure::Call(e)),
            Err(_) => return Err(RenderFailure::Timeout),
        };

        parse_image_response(&value).map_err(RenderFailure::Malformed)
    }
}

/// Parse a provider response per the contract in §4.3: a mapping with
/// `images` (or `image`) holding a single record or a non-empty sequence
/// of records. Multi-image responses use the first element and log a
/// warning - the provider was only asked for one image.
fn parse_image_response(value: &Value) -> Result<ProviderImage, String> {
    let container = value
        .get("images")
        .or_else(|| value.get("image"))
        .ok_or_else(|| "response missing 'images'/'image' key".to_string())?;

    let record = match container {
        Value::Array(items) => {
            if items.is_empty() {
                return Err("'images' sequence was empty".to_string());
            }
            if items.len() > 1 {
                tracing::warn!(
                    count = items.len(),
                    "provider returned multiple images for a single-image request; using the first"
                );
            }
            &items[0]
        }
        Value::Object(_) => container,
        _ => return Err("'images'/'image' was neither an object nor an array".to_string()),
    };

    let url = ["url", "signed_url", "image_url"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "image record had no non-empty url field".to_string())?;

    let width = record.get("width").and_then(Value::as_u64).unwrap_or(0) as u32;
    let height = record.get("height").and_then(Value::as_u64).unwrap_or(0) as u32;

    Ok(ProviderImage {
        url: url.to_string(),
        width,
        height,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_image_object_under_images() {
        let v = serde_json::json!({"images": {"url": "https://img/x.png", "width": 1024, "height": 576}});
        let img = parse_image_response(&v).unwrap();
        assert_eq!(img.url, "https://img/x.png");
        assert_eq!(img.width, 1024);
        assert_eq!(img.height, 576);
    }

    #[test]
    fn parses_sequence_and_uses_first_element() {
        let v = serde_json::json!({"images": [
            {"url": "https://img/first.png"},
            {"url": "https://img/second.png"},
        ]});
        let img = parse_image_response(&v).unwrap();
        assert_eq!(img.url, "https://img/first.png");
    }

    #[test]
    fn accepts_singular_image_key() {
        let v = serde_json::json!({"image": {"url": "https://img/x.png"}});
        let img = parse_image_response(&v).unwrap();
        assert_eq!(img.url, "https://img/x.png");
    }

    #[test]
    fn falls_back_through_url_field_priority() {
        let v = serde_json::json!({"images": {"signed_url": "https://img/signed.png"}});
        let img = parse_image_response(&v).unwrap();
        assert_eq!(img.url, "https://img/signed.png");
    }

    #[test]
    fn empty_sequence_is_malformed() {
        let v = serde_json::json!({"images": []});
        assert!(parse_image_response(&v).is_err());
    }

    #[test]
    fn missing_url_is_malformed() {
        let v = serde_json::json!({"images": {"width": 10, "height": 10}});
        assert!(parse_image_response(&v).is_err());
    }

    #[test]
    fn missing_images_key_is_malformed() {
        let v = serde_json::json!({"unrelated": true});
        assert!(parse_image_response(&v).is_err());
    }

    #[test]
    fn empty_url_string_is_malformed() {
        let v = serde_json::json!({"images": {"url": ""}});
        assert!(parse_image_response(&v).is_err());
    }
}
