//! Tool call surface types.
//!
//! [`ToolCall`] in, [`ToolResult`] out — the only boundary contract the
//! surrounding web layer depends on.

use serde::{Deserialize, Serialize};

/// A tool invocation issued by the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Opaque correlation token, unique per call in a session.
    pub id: String,
    /// Selects the handler.
    pub name: String,
    /// Handler-specific argument mapping.
    pub arguments: serde_json::Value,
}

/// Outcome of executing a tool call.
///
/// `ok` reflects whether the handler ran to completion. Per-item failures of
/// a batch handler live inside `result`; `error` is reserved for structural
/// failures (unknown tool, missing capability, malformed arguments).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result with a payload.
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// A call-level failure.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Per-item status within a batch tool result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ok,
    Error,
}

/// Per-item outcome of a batch tool call.
///
/// Result sequences are always index-aligned with the input sequence;
/// concurrency never reorders them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchItemResult {
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    /// A successful item carrying its output URL.
    pub fn ok(url: impl Into<String>) -> Self {
        Self {
            status: ItemStatus::Ok,
            url: Some(url.into()),
            error: None,
        }
    }

    /// A failed item carrying its error description.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: ItemStatus::Error,
            url: None,
            error: Some(error.into()),
        }
    }
}
