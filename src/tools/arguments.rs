//! Typed access to tool call arguments.

use crate::error::{EaselError, Result};

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| EaselError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an array-of-strings argument. Every element must be a string.
    pub fn get_str_array(&self, key: &str) -> Result<Vec<String>> {
        let items = self
            .value
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| EaselError::InvalidArgument(format!("Missing array argument: {key}")))?;
        items
            .iter()
            .map(|item| {
                item.as_str().map(|s| s.to_string()).ok_or_else(|| {
                    EaselError::InvalidArgument(format!("Argument '{key}' must contain only strings"))
                })
            })
            .collect()
    }
}
