//! Collaborator seams for the save workflow
//!
//! The coordinator touches the outside world only through the traits here:
//! remote persistence, code rewriting, user notifications, snippet storage,
//! and modal dialogs. Production implementations live with the embedding
//! shell; [`InMemorySnippetRegistry`] ships here because snippets never
//! leave the workbench process.

use dashmap::DashMap;
use qd_view::View;
use serde_json::Value;

/// Errors from the remote view store
///
/// A rejection carries the raw response payload so it can be surfaced
/// verbatim in the failure notification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Request reached the store and was rejected
    #[error("store rejected request (status {status}): {payload}")]
    Rejected {
        /// Response status code
        status: u16,
        /// Raw response payload
        payload: Value,
    },

    /// Request never completed
    #[error("transport failure: {0}")]
    Transport(String),
}

impl StoreError {
    /// Raw payload for the failure notification
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Rejected { payload, .. } => payload.clone(),
            Self::Transport(message) => Value::String(message.clone()),
        }
    }
}

/// Remote view persistence
///
/// Both operations are single-shot: one request, one outcome, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ViewStore: Send + Sync {
    /// Persist a brand-new view under its name
    async fn create_view(&self, view: &View) -> Result<(), StoreError>;

    /// Persist changes to an existing view
    async fn update_view(&self, view: &View) -> Result<(), StoreError>;
}

/// Turns editor code into its persistable form
///
/// Pure text transformation; called once per submission on both paths.
#[cfg_attr(test, mockall::automock)]
pub trait CodeRewriter: Send + Sync {
    /// Rewrite `code` for persistence
    fn rewrite_for_persistence(&self, code: &str) -> String;
}

/// Notification severities surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Operation committed
    Success,
    /// Operation failed
    Error,
}

/// Toast-style user notifications
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Raise one notification, optionally with a raw detail string
    ///
    /// The detail lifetime is named so the test mock can be generated for
    /// the nested reference.
    fn notify<'a>(&self, kind: NotificationKind, message: &str, detail: Option<&'a str>);
}

/// Named code snippets
pub trait SnippetRegistry: Send + Sync {
    /// True if a snippet with this name is already stored
    fn exists(&self, name: &str) -> bool;

    /// Store a snippet under `name`
    fn save(&self, name: &str, code: &str);
}

/// Process-local snippet registry
#[derive(Debug, Default)]
pub struct InMemorySnippetRegistry {
    snippets: DashMap<String, String>,
}

impl InMemorySnippetRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored code for `name`, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.snippets.get(name).map(|entry| entry.value().clone())
    }

    /// Number of stored snippets
    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

impl SnippetRegistry for InMemorySnippetRegistry {
    fn exists(&self, name: &str) -> bool {
        self.snippets.contains_key(name)
    }

    fn save(&self, name: &str, code: &str) {
        self.snippets.insert(name.to_string(), code.to_string());
    }
}

/// Dialog templates the workflow can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalTemplate {
    /// Save-or-update view dialog
    SaveView,
    /// Save-snippet dialog
    SaveSnippet,
}

/// Handle to an open dialog
pub trait ModalSession: Send + Sync {
    /// Close the dialog
    fn close(&self);
}

/// Opens modal dialogs
#[cfg_attr(test, mockall::automock)]
pub trait ModalHost: Send + Sync {
    /// Open the given template, returning a handle to close it later
    fn open(&self, template: ModalTemplate) -> Box<dyn ModalSession>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_payload_is_passed_through() {
        let error = StoreError::Rejected {
            status: 409,
            payload: json!({"error": "name taken"}),
        };
        assert_eq!(error.payload(), json!({"error": "name taken"}));
    }

    #[test]
    fn transport_payload_is_the_message() {
        let error = StoreError::Transport("connection reset".to_string());
        assert_eq!(error.payload(), json!("connection reset"));
    }

    #[test]
    fn registry_reports_stored_names() {
        let registry = InMemorySnippetRegistry::new();
        assert!(!registry.exists("vitals"));
        assert!(registry.is_empty());

        registry.save("vitals", "SELECT o FROM observation o");
        assert!(registry.exists("vitals"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("vitals").as_deref(),
            Some("SELECT o FROM observation o")
        );
    }

    #[test]
    fn registry_overwrites_same_name() {
        let registry = InMemorySnippetRegistry::new();
        registry.save("s", "v1");
        registry.save("s", "v2");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("s").as_deref(), Some("v2"));
    }
}
