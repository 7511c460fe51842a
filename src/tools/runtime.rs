//! Tool dispatch by name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::types::{ToolCall, ToolResult};

use super::arguments::ToolArguments;
use super::builtin::{GenerateImagesTool, RemoveBackgroundTool};
use super::tool::{ToolContext, ToolHandler};

/// Dispatches tool calls to registered handlers.
///
/// The registry is resolved once at construction; execution is a map
/// lookup, never reflection. Partial per-item failure of a batch handler is
/// reported inside the result payload — `ok = false` means the call itself
/// could not run.
pub struct ToolRuntime {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    ctx: ToolContext,
}

impl ToolRuntime {
    /// Create an empty runtime.
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            handlers: HashMap::new(),
            ctx,
        }
    }

    /// Create a runtime with the built-in image tools registered.
    pub fn with_builtins(ctx: ToolContext) -> Self {
        let mut runtime = Self::new(ctx);
        runtime.register(Arc::new(GenerateImagesTool));
        runtime.register(Arc::new(RemoveBackgroundTool));
        runtime
    }

    /// Register a handler under its own name.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Names of all registered tools.
    pub fn tool_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Execute one tool call.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(handler) = self.handlers.get(&call.name) else {
            warn!(tool = %call.name, call_id = %call.id, "unknown tool");
            return ToolResult::failure(format!("unknown tool: {}", call.name));
        };

        debug!(tool = %call.name, call_id = %call.id, "executing tool");
        let args = ToolArguments::new(call.arguments.clone());
        match handler.execute(&args, &self.ctx).await {
            Ok(result) => ToolResult::success(result),
            Err(err) => {
                warn!(tool = %call.name, call_id = %call.id, error = %err, "tool failed");
                ToolResult::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{EaselError, Result};
    use crate::image::ImageService;
    use crate::state::AgentFileState;

    /// Image service that tracks in-flight calls and fails on request.
    ///
    /// Prompts or URLs containing "fail" produce an error for that item.
    struct FakeImages {
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FakeImages {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            })
        }

        async fn tracked(&self, input: &str, prefix: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            if input.contains("fail") {
                Err(EaselError::api(500, format!("cannot process {input}")))
            } else {
                Ok(format!("{prefix}{input}"))
            }
        }
    }

    #[async_trait]
    impl ImageService for FakeImages {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.tracked(prompt, "url-for-").await
        }

        async fn remove_background(&self, image_url: &str) -> Result<String> {
            self.tracked(image_url, "nobg-").await
        }
    }

    fn context(images: Arc<FakeImages>) -> ToolContext {
        ToolContext {
            file_state: AgentFileState::new(),
            images: Some(images),
            image_generation_enabled: true,
        }
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "test".into(),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn unknown_tool_fails_at_call_level() {
        let runtime = ToolRuntime::with_builtins(context(FakeImages::new()));
        let result = runtime.execute(&call("frobnicate", serde_json::json!({}))).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("unknown tool: frobnicate"));
    }

    #[tokio::test]
    async fn generate_batches_with_ceiling_of_three() {
        let images = FakeImages::new();
        let runtime = ToolRuntime::with_builtins(context(images.clone()));

        let prompts: Vec<String> = (0..7).map(|i| format!("prompt-{i}")).collect();
        let result = runtime
            .execute(&call("generate_images", serde_json::json!({ "prompts": prompts })))
            .await;

        assert!(result.ok);
        let items = result.result.unwrap()["images"].as_array().unwrap().clone();
        assert_eq!(items.len(), 7);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item["status"], "ok");
            assert_eq!(item["url"], format!("url-for-prompt-{i}"));
            assert_eq!(item["prompt"], format!("prompt-{i}"));
        }
        assert!(images.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn remove_background_batches_with_ceiling_of_twenty() {
        let images = FakeImages::new();
        let runtime = ToolRuntime::with_builtins(context(images.clone()));

        let urls: Vec<String> = (0..25)
            .map(|i| format!("https://example.com/img-{i}.png"))
            .collect();
        let result = runtime
            .execute(&call("remove_background", serde_json::json!({ "image_urls": urls })))
            .await;

        assert!(result.ok);
        let items = result.result.unwrap()["images"].as_array().unwrap().clone();
        assert_eq!(items.len(), 25);
        assert!(items.iter().all(|item| item["status"] == "ok"));
        assert_eq!(
            items[0]["url"],
            "nobg-https://example.com/img-0.png"
        );
        assert!(images.peak.load(Ordering::SeqCst) <= 20);
    }

    #[tokio::test]
    async fn partial_failure_keeps_call_level_ok() {
        let runtime = ToolRuntime::with_builtins(context(FakeImages::new()));

        let prompts = ["p0", "p1", "fail-me", "p3", "p4"];
        let result = runtime
            .execute(&call("generate_images", serde_json::json!({ "prompts": prompts })))
            .await;

        assert!(result.ok);
        assert!(result.error.is_none());
        let items = result.result.unwrap()["images"].as_array().unwrap().clone();
        assert_eq!(items.len(), 5);
        for (i, item) in items.iter().enumerate() {
            if i == 2 {
                assert_eq!(item["status"], "error");
                assert!(item["error"].as_str().unwrap().contains("fail-me"));
            } else {
                assert_eq!(item["status"], "ok");
            }
        }
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_service_calls() {
        let images = FakeImages::new();
        let runtime = ToolRuntime::with_builtins(context(images.clone()));

        let result = runtime
            .execute(&call("generate_images", serde_json::json!({ "prompts": [] })))
            .await;

        assert!(result.ok);
        assert!(result.result.unwrap()["images"].as_array().unwrap().is_empty());
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disabled_generation_is_a_structural_failure() {
        let mut ctx = context(FakeImages::new());
        ctx.image_generation_enabled = false;
        let runtime = ToolRuntime::with_builtins(ctx);

        let result = runtime
            .execute(&call("generate_images", serde_json::json!({ "prompts": ["p"] })))
            .await;

        assert!(!result.ok);
        assert!(result.error.unwrap().contains("disabled"));
    }

    #[tokio::test]
    async fn missing_credential_is_a_structural_failure() {
        let ctx = ToolContext {
            file_state: AgentFileState::new(),
            images: None,
            image_generation_enabled: true,
        };
        let runtime = ToolRuntime::with_builtins(ctx);

        let result = runtime
            .execute(&call(
                "remove_background",
                serde_json::json!({ "image_urls": ["https://example.com/a.png"] }),
            ))
            .await;

        assert!(!result.ok);
        assert!(result.error.unwrap().contains("credential"));
    }

    #[tokio::test]
    async fn malformed_arguments_are_a_structural_failure() {
        let runtime = ToolRuntime::with_builtins(context(FakeImages::new()));

        let result = runtime
            .execute(&call("generate_images", serde_json::json!({ "prompts": "not a list" })))
            .await;

        assert!(!result.ok);
        assert!(result.error.unwrap().contains("prompts"));
    }

    #[tokio::test]
    async fn tool_names_lists_builtins() {
        let runtime = ToolRuntime::with_builtins(context(FakeImages::new()));
        let mut names = runtime.tool_names();
        names.sort_unstable();
        assert_eq!(names, vec!["generate_images", "remove_background"]);
    }
}
