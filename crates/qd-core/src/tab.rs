//! Editor tabs
//!
//! A [`Tab`] is one editing session: the live editor state plus the stored
//! view it was opened from, if any. Tabs are the unit the save workflow
//! operates on and the payload of the events it emits.

use qd_view::{DeclaredParameters, View, ViewType};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique tab identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TabId(pub Ulid);

impl TabId {
    /// Generate new tab ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live editor state for one tab
///
/// Structured-query code and script code declare parameters through separate
/// channels; both sets are carried so the selection can follow the view type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    /// Current code text
    pub code: String,
    /// Parameters declared by structured-query code
    pub query_parameters: DeclaredParameters,
    /// Parameters declared by script code
    pub script_parameters: DeclaredParameters,
}

impl EditorState {
    /// Editor state holding only code
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Set the structured-query declarations
    #[must_use]
    pub fn with_query_parameters(mut self, parameters: DeclaredParameters) -> Self {
        self.query_parameters = parameters;
        self
    }

    /// Set the script declarations
    #[must_use]
    pub fn with_script_parameters(mut self, parameters: DeclaredParameters) -> Self {
        self.script_parameters = parameters;
        self
    }

    /// Declaration source for the given view type
    ///
    /// Script views read the script declarations; query views and tabs with
    /// no view at all read the structured-query declarations. Both save and
    /// update go through here so the two paths can never disagree.
    #[must_use]
    pub fn declared_parameters_for(&self, view_type: Option<ViewType>) -> &DeclaredParameters {
        match view_type {
            Some(ViewType::Script) => &self.script_parameters,
            _ => &self.query_parameters,
        }
    }
}

/// One editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Tab identifier
    pub id: TabId,
    /// Display name
    pub name: String,
    /// Stored view this tab edits, absent for scratch work
    pub view: Option<View>,
    /// Whether the tab carries changes not yet persisted
    pub unsaved: bool,
    /// Live editor state
    pub editor: EditorState,
}

impl Tab {
    /// Create a scratch tab with no attached view
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TabId::new(),
            name: name.into(),
            view: None,
            unsaved: false,
            editor: EditorState::default(),
        }
    }

    /// Attach a stored view
    #[must_use]
    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    /// Set the editor state
    #[must_use]
    pub fn with_editor(mut self, editor: EditorState) -> Self {
        self.editor = editor;
        self
    }

    /// Mark the tab as carrying unpersisted changes
    #[must_use]
    pub fn with_unsaved(mut self, unsaved: bool) -> Self {
        self.unsaved = unsaved;
        self
    }

    /// Declaration source selected by the attached view's type
    #[inline]
    #[must_use]
    pub fn declared_parameters(&self) -> &DeclaredParameters {
        self.editor
            .declared_parameters_for(self.view.as_ref().map(|view| view.view_type))
    }
}
