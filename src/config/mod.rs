//! Configuration loaded from the environment.

use crate::error::{EaselError, Result};

/// Runtime configuration for the agent backend.
///
/// Loaded once at startup from environment variables (a `.env` file is
/// honored if present). The tool runtime and provider bindings read from
/// this rather than touching the environment themselves.
#[derive(Debug, Clone, Default)]
pub struct EaselConfig {
    /// OpenAI API key for the Responses provider.
    pub openai_api_key: Option<String>,
    /// Override for the OpenAI base URL.
    pub openai_base_url: Option<String>,
    /// Replicate API token for image generation and background removal.
    pub replicate_api_token: Option<String>,
    /// When set, batch image tools refuse to run.
    pub image_generation_disabled: bool,
}

impl EaselConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            replicate_api_token: std::env::var("REPLICATE_API_TOKEN").ok(),
            image_generation_disabled: matches!(
                std::env::var("EASEL_DISABLE_IMAGE_GENERATION").as_deref(),
                Ok("1" | "true" | "TRUE")
            ),
        }
    }

    /// The OpenAI key, or an authentication error if unset.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| EaselError::Authentication("OPENAI_API_KEY is not set".into()))
    }

    /// The Replicate token, or an authentication error if unset.
    pub fn require_replicate_token(&self) -> Result<&str> {
        self.replicate_api_token
            .as_deref()
            .ok_or_else(|| EaselError::Authentication("REPLICATE_API_TOKEN is not set".into()))
    }
}
