//! View artifact model
//!
//! Defines [`View`], the named, versioned artifact the workbench persists:
//! query code bundled with a serialized parameter-metadata document.
//! A view is plain data - all workflow behavior lives in `qd-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a view's code is interpreted
///
/// Newly saved views are always [`ViewType::Query`]; the script flavor only
/// appears on artifacts that were authored as scripts elsewhere. The type
/// also selects which declared-parameter source the editor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewType {
    /// Structured query code
    Query,
    /// Script code
    Script,
}

impl ViewType {
    /// True for script views
    #[inline]
    #[must_use]
    pub fn is_script(self) -> bool {
        matches!(self, Self::Script)
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "QUERY"),
            Self::Script => write!(f, "SCRIPT"),
        }
    }
}

/// Executable payload of a view
///
/// Carries the persistable form of the editor code plus its own type tag.
/// The step type is allowed to differ from the owning view's type: a save
/// over a script-typed artifact keeps the script step type even though the
/// new view itself is query-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSteps {
    /// Persistable (path-rewritten) code
    pub code: String,
    /// Step type tag
    #[serde(rename = "type")]
    pub step_type: ViewType,
}

impl ViewSteps {
    /// Create a steps payload
    #[must_use]
    pub fn new(code: impl Into<String>, step_type: ViewType) -> Self {
        Self {
            code: code.into(),
            step_type,
        }
    }
}

/// Named, versioned view artifact
///
/// # Invariants
/// - `name` is the identity key under which the store persists the view
/// - `metadata`, when present, is a serialized JSON object; only its
///   `parameters` field is owned by the save workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// Identity key
    pub name: String,
    /// Free-form version label
    pub version: String,
    /// View type tag
    #[serde(rename = "type")]
    pub view_type: ViewType,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Executable payload
    pub steps: ViewSteps,
    /// Serialized metadata document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// Free-form description
    pub description: String,
}

impl View {
    /// Create a view with no metadata document, timestamped now
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        view_type: ViewType,
        steps: ViewSteps,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            view_type,
            created_at: Utc::now(),
            steps,
            metadata: None,
            description: description.into(),
        }
    }

    /// Attach a serialized metadata document
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}
