//! Shared file state handed to tool handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Opaque container for the session's file/canvas state.
///
/// The tool runtime threads this into every handler without inspecting it;
/// handlers read and write whatever shape the surrounding app persists.
/// Cloning is cheap and shares the underlying document.
#[derive(Debug, Clone, Default)]
pub struct AgentFileState {
    document: Arc<RwLock<serde_json::Value>>,
}

impl AgentFileState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapping an existing document.
    pub fn from_value(document: serde_json::Value) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
        }
    }

    /// Read a top-level field, cloned out of the document.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.document.read().await.get(key).cloned()
    }

    /// Write a top-level field. Non-object documents are replaced by an
    /// object first.
    pub async fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        let mut doc = self.document.write().await;
        if !doc.is_object() {
            *doc = serde_json::json!({});
        }
        if let Some(obj) = doc.as_object_mut() {
            obj.insert(key.into(), value);
        }
    }

    /// Snapshot the whole document.
    pub async fn snapshot(&self) -> serde_json::Value {
        self.document.read().await.clone()
    }
}
