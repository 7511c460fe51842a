//! Built-in batch image tools.
//!
//! Both tools fan a list argument out through
//! [`run_bounded`](crate::util::batch::run_bounded) and aggregate per-item
//! outcomes under the `images` key, index-aligned with the input. Individual
//! failures stay inside their own slot; only structural problems (missing
//! capability, malformed arguments) fail the call.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{EaselError, Result};
use crate::types::BatchItemResult;
use crate::util::batch::run_bounded;

use super::arguments::ToolArguments;
use super::tool::{ToolContext, ToolHandler};

/// Generation calls are rate-limit sensitive; keep the fan-out small.
pub const GENERATE_CONCURRENCY: usize = 3;
/// Background removal is cheap on the provider side; allow a wide fan-out.
pub const REMOVE_BACKGROUND_CONCURRENCY: usize = 20;

/// `generate_images` — text-to-image over a list of prompts.
#[derive(Debug, Default)]
pub struct GenerateImagesTool;

#[async_trait]
impl ToolHandler for GenerateImagesTool {
    fn name(&self) -> &str {
        "generate_images"
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<serde_json::Value> {
        if !ctx.image_generation_enabled {
            return Err(EaselError::tool(
                self.name(),
                "image generation is disabled for this session",
            ));
        }
        let service = ctx.require_images(self.name())?;
        let prompts = args.get_str_array("prompts")?;
        debug!(count = prompts.len(), "generate_images batch");

        let outcomes = run_bounded(prompts.clone(), GENERATE_CONCURRENCY, move |prompt| {
            let service = service.clone();
            async move { service.generate(&prompt).await }
        })
        .await;

        let images: Vec<serde_json::Value> = prompts
            .iter()
            .zip(outcomes)
            .map(|(prompt, outcome)| {
                let mut item = serde_json::to_value(match outcome {
                    Ok(url) => BatchItemResult::ok(url),
                    Err(err) => BatchItemResult::error(err.to_string()),
                })
                .unwrap_or_default();
                if let Some(obj) = item.as_object_mut() {
                    obj.insert("prompt".into(), prompt.clone().into());
                }
                item
            })
            .collect();

        Ok(serde_json::json!({ "images": images }))
    }
}

/// `remove_background` — background removal over a list of image URLs.
#[derive(Debug, Default)]
pub struct RemoveBackgroundTool;

#[async_trait]
impl ToolHandler for RemoveBackgroundTool {
    fn name(&self) -> &str {
        "remove_background"
    }

    async fn execute(&self, args: &ToolArguments, ctx: &ToolContext) -> Result<serde_json::Value> {
        let service = ctx.require_images(self.name())?;
        let image_urls = args.get_str_array("image_urls")?;
        debug!(count = image_urls.len(), "remove_background batch");

        let outcomes = run_bounded(
            image_urls.clone(),
            REMOVE_BACKGROUND_CONCURRENCY,
            move |url| {
                let service = service.clone();
                async move { service.remove_background(&url).await }
            },
        )
        .await;

        let images: Vec<serde_json::Value> = image_urls
            .iter()
            .zip(outcomes)
            .map(|(source, outcome)| {
                let mut item = serde_json::to_value(match outcome {
                    Ok(url) => BatchItemResult::ok(url),
                    Err(err) => BatchItemResult::error(err.to_string()),
                })
                .unwrap_or_default();
                if let Some(obj) = item.as_object_mut() {
                    obj.insert("source".into(), source.clone().into());
                }
                item
            })
            .collect();

        Ok(serde_json::json!({ "images": images }))
    }
}
