//! Easel agent core.
//!
//! The backend half of the Easel canvas app that talks to model providers
//! and runs agent tools. Two subsystems carry the weight:
//!
//! - [`provider`] — normalizes provider-native streaming events into the
//!   canonical [`types::StreamEvent`] protocol the UI consumes.
//! - [`tools`] — dispatches tool calls by name; batch-shaped tools fan out
//!   through [`util::batch::run_bounded`] with a concurrency ceiling and
//!   order-preserving, per-item-isolated aggregation.
//!
//! # Quick Start
//!
//! ```no_run
//! use easel::tools::{ToolContext, ToolRuntime};
//! use easel::types::ToolCall;
//!
//! # async fn example(ctx: ToolContext) -> easel::error::Result<()> {
//! let runtime = ToolRuntime::with_builtins(ctx);
//! let result = runtime
//!     .execute(&ToolCall {
//!         id: "call_1".into(),
//!         name: "generate_images".into(),
//!         arguments: serde_json::json!({ "prompts": ["a red bicycle"] }),
//!     })
//!     .await;
//! assert!(result.ok);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod image;
pub mod prelude;
pub mod provider;
pub mod state;
pub mod tools;
pub mod types;
pub mod util;
