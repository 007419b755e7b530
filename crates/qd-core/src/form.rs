//! Save dialog forms
//!
//! Plain structs mirroring the two dialogs, plus the prefill rules applied
//! when a dialog opens. Validation lives in [`crate::validation`]; the forms
//! themselves carry no behavior beyond prefill.

use crate::tab::Tab;

/// Create-vs-update decision for one workflow pass
///
/// Recorded when the dialog opens and consulted once at submit time; the
/// submission never re-derives it from current tab state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SaveMode {
    /// Persist a brand-new view
    #[default]
    Create,
    /// Mutate the tab's attached view in place
    Update,
}

impl SaveMode {
    /// Mode implied by a tab: unpersisted changes to it mean update
    #[inline]
    #[must_use]
    pub fn for_tab(tab: &Tab) -> Self {
        if tab.unsaved {
            Self::Update
        } else {
            Self::Create
        }
    }

    /// True in update mode
    ///
    /// The dialog locks the name field while this holds: the name is the
    /// identity key and the update path never applies it.
    #[inline]
    #[must_use]
    pub fn is_update(self) -> bool {
        matches!(self, Self::Update)
    }
}

/// Fields of the save-view dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveForm {
    /// View name (identity key; ignored on update)
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Free-form version label
    pub version: String,
    /// Update-confirmation checkbox; carried for the dialog, never validated
    pub update_agreement: bool,
}

impl SaveForm {
    /// Form with the three text fields set
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            update_agreement: false,
        }
    }

    /// Prefill for a freshly opened dialog
    ///
    /// Update mode copies the tab name plus the attached view's description
    /// and version; create mode starts blank.
    #[must_use]
    pub fn prefill(tab: &Tab, mode: SaveMode) -> Self {
        match (&tab.view, mode) {
            (Some(view), SaveMode::Update) => Self {
                name: tab.name.clone(),
                description: view.description.clone(),
                version: view.version.clone(),
                update_agreement: false,
            },
            _ => Self::default(),
        }
    }
}

/// Field of the save-snippet dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetForm {
    /// Snippet name
    pub name: String,
}

impl SnippetForm {
    /// Form with the name set
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Suggested snippet name for a tab title
    ///
    /// Every whitespace character becomes an underscore.
    #[must_use]
    pub fn suggested(title: &str) -> Self {
        Self {
            name: title
                .chars()
                .map(|c| if c.is_whitespace() { '_' } else { c })
                .collect(),
        }
    }
}
