//! Convenience re-exports for common Easel usage.

pub use crate::config::EaselConfig;
pub use crate::error::{EaselError, Result};
pub use crate::image::ImageService;
pub use crate::provider::openai_responses::{parse_event, ResponsesParseState};
pub use crate::state::AgentFileState;
pub use crate::tools::{ToolContext, ToolRuntime};
pub use crate::types::{StreamEvent, ToolCall, ToolResult};
pub use crate::util::batch::run_bounded;
