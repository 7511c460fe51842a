//! Tool handler trait and execution context.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EaselConfig;
use crate::error::{EaselError, Result};
use crate::image::{ImageService, ReplicateImages};
use crate::state::AgentFileState;

use super::arguments::ToolArguments;

/// Ambient capabilities available during tool execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Session file/canvas state; read and written by handlers, never
    /// inspected by the runtime.
    pub file_state: AgentFileState,
    /// Injected image operations, when a credential is configured.
    pub images: Option<Arc<dyn ImageService>>,
    /// Feature flag gating the generation path.
    pub image_generation_enabled: bool,
}

impl ToolContext {
    /// Build a context from loaded configuration.
    ///
    /// The image service is wired up only when a Replicate token is
    /// configured; handlers report the missing capability otherwise.
    pub fn from_config(config: &EaselConfig, file_state: AgentFileState) -> Self {
        let images: Option<Arc<dyn ImageService>> = config
            .replicate_api_token
            .as_deref()
            .map(|token| Arc::new(ReplicateImages::new(token)) as Arc<dyn ImageService>);
        Self {
            file_state,
            images,
            image_generation_enabled: !config.image_generation_disabled,
        }
    }

    /// The image service, or a structural error naming the tool when no
    /// credential was configured.
    pub fn require_images(&self, tool_name: &str) -> Result<Arc<dyn ImageService>> {
        self.images
            .clone()
            .ok_or_else(|| EaselError::tool(tool_name, "no image service credential configured"))
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("images", &self.images.as_ref().map(|_| ".."))
            .field("image_generation_enabled", &self.image_generation_enabled)
            .finish()
    }
}

/// Core tool trait — implement to register a handler with the runtime.
///
/// An `Ok` return means the handler ran to completion; batch handlers
/// report per-item failures inside the payload. `Err` is reserved for
/// structural problems (missing capability, malformed arguments).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Execute the tool with parsed arguments.
    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<serde_json::Value>;
}
