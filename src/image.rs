//! Image generation capability.
//!
//! The tool runtime treats image generation and background removal as an
//! injected collaborator behind [`ImageService`]; [`ReplicateImages`] is the
//! production binding over the Replicate predictions API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{EaselError, Result};
use crate::provider::http::{bearer_headers, shared_client, status_to_error};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
const GENERATION_MODEL: &str = "black-forest-labs/flux-schnell";
const REMOVAL_MODEL: &str = "lucataco/remove-bg";

/// Async capability for per-item image operations.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Generate one image from a text prompt, returning its URL.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Remove the background from an image, returning the new URL.
    async fn remove_background(&self, image_url: &str) -> Result<String>;
}

/// [`ImageService`] backed by Replicate.
pub struct ReplicateImages {
    api_token: String,
    base_url: String,
}

impl ReplicateImages {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a prediction synchronously (`Prefer: wait`) and return its
    /// first output URL.
    async fn predict(&self, model: &str, input: serde_json::Value) -> Result<String> {
        let url = format!("{}/models/{}/predictions", self.base_url, model);
        debug!(model, "Replicate prediction");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_token))
            .header("Prefer", "wait")
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body));
        }

        let prediction: Prediction = resp.json().await?;
        prediction.first_output().ok_or_else(|| {
            EaselError::api(200, format!("Replicate prediction for {model} had no output"))
        })
    }
}

#[async_trait]
impl ImageService for ReplicateImages {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.predict(
            GENERATION_MODEL,
            serde_json::json!({ "prompt": prompt, "output_format": "png" }),
        )
        .await
    }

    async fn remove_background(&self, image_url: &str) -> Result<String> {
        self.predict(REMOVAL_MODEL, serde_json::json!({ "image": image_url }))
            .await
    }
}

/// Replicate prediction payload. `output` is a URL or list of URLs
/// depending on the model.
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    output: Option<serde_json::Value>,
}

impl Prediction {
    fn first_output(&self) -> Option<String> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url.clone()),
            serde_json::Value::Array(items) => items
                .first()
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_output_handles_string() {
        let prediction: Prediction =
            serde_json::from_value(serde_json::json!({ "output": "https://r8.im/a.png" }))
                .unwrap();
        assert_eq!(prediction.first_output().unwrap(), "https://r8.im/a.png");
    }

    #[test]
    fn first_output_handles_array() {
        let prediction: Prediction = serde_json::from_value(
            serde_json::json!({ "output": ["https://r8.im/a.png", "https://r8.im/b.png"] }),
        )
        .unwrap();
        assert_eq!(prediction.first_output().unwrap(), "https://r8.im/a.png");
    }

    #[test]
    fn first_output_empty_when_missing() {
        let prediction: Prediction = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(prediction.first_output().is_none());
    }
}
