//! Tool execution runtime.

pub mod arguments;
pub mod builtin;
pub mod runtime;
pub mod tool;

pub use arguments::ToolArguments;
pub use builtin::{GenerateImagesTool, RemoveBackgroundTool};
pub use runtime::ToolRuntime;
pub use tool::{ToolContext, ToolHandler};
