//! Canonical streaming event protocol.
//!
//! Provider-agnostic representation of streamed model output. The provider
//! parsers emit these; the UI consumes them. Once constructed an event is
//! never mutated.

use serde::{Deserialize, Serialize};

use super::message::AgentToolCall;

/// A canonical event emitted during streaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental reasoning/thought text.
    ThinkingDelta { text: String },
    /// Incremental assistant output text.
    TextDelta { text: String },
    /// A completed tool invocation request from the model.
    ToolCallDelta { tool_call: AgentToolCall },
    /// Stream finished.
    Done,
    /// Error surfaced mid-stream.
    Error { message: String },
}

impl StreamEvent {
    /// Shorthand for a thinking fragment.
    pub fn thinking(text: impl Into<String>) -> Self {
        Self::ThinkingDelta { text: text.into() }
    }

    /// Shorthand for an output text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    /// Shorthand for a stream error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
