//! Querydesk Workflow Core
//!
//! The save workflow for the query workbench:
//! - Records the create-vs-update decision when a save dialog opens
//! - Validates dialog forms before any side effect
//! - Builds and reconciles parameter metadata for the persisted view
//! - Applies optimistic local mutation with steps-only rollback on failure
//! - Emits one workbench event per committed submission
//!
//! # Example
//!
//! ```rust,ignore
//! use qd_core::{
//!     Collaborators, ModalTemplate, SaveForm, SaveMode, ViewPersistenceCoordinator,
//!     WorkbenchConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (events, receiver) = tokio::sync::mpsc::unbounded_channel();
//! let mut coordinator =
//!     ViewPersistenceCoordinator::new(collaborators, events, WorkbenchConfig::new());
//!
//! coordinator.open_modal(ModalTemplate::SaveView, SaveMode::for_tab(&tab));
//! let form = SaveForm::prefill(&tab, coordinator.mode());
//!
//! coordinator.submit(&mut tab, &form).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod coordinator;
pub mod error;
pub mod form;
pub mod services;
pub mod tab;
pub mod validation;

// Re-exports for convenience
pub use config::{WorkbenchConfig, DEFAULT_MIN_NAME_LENGTH};
pub use coordinator::{Collaborators, ViewPersistenceCoordinator, WorkbenchEvent};
pub use error::WorkflowError;
pub use form::{SaveForm, SaveMode, SnippetForm};
pub use services::{
    CodeRewriter, InMemorySnippetRegistry, ModalHost, ModalSession, ModalTemplate,
    NotificationKind, Notifier, SnippetRegistry, StoreError, ViewStore,
};
pub use tab::{EditorState, Tab, TabId};
pub use validation::{
    FieldRule, FieldViolation, FormField, FormValidationGate, ValidationError,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the save workflow
    pub use crate::{
        Collaborators, ModalTemplate, NotificationKind, SaveForm, SaveMode, SnippetForm, Tab,
        TabId, ViewPersistenceCoordinator, WorkbenchConfig, WorkbenchEvent, WorkflowError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::services::{MockCodeRewriter, MockModalHost, MockNotifier, MockViewStore};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct NoopSession;

    impl ModalSession for NoopSession {
        fn close(&self) {}
    }

    #[tokio::test]
    async fn first_save_runs_the_whole_surface() {
        let mut store = MockViewStore::new();
        store.expect_create_view().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).return_const(());
        let mut rewriter = MockCodeRewriter::new();
        rewriter
            .expect_rewrite_for_persistence()
            .returning(|code| code.to_string());
        let mut modal_host = MockModalHost::new();
        modal_host.expect_open().returning(|_| Box::new(NoopSession));

        let (events, mut receiver) = mpsc::unbounded_channel();
        let collaborators = Collaborators {
            store: Arc::new(store),
            rewriter: Arc::new(rewriter),
            notifier: Arc::new(notifier),
            snippets: Arc::new(InMemorySnippetRegistry::new()),
            modal_host: Arc::new(modal_host),
        };
        let mut coordinator =
            ViewPersistenceCoordinator::new(collaborators, events, WorkbenchConfig::new());

        // Scratch tab: no view, nothing unsaved, so the dialog opens in
        // create mode and prefills blank
        let mut tab = Tab::new("scratch").with_editor(EditorState::new("SELECT 1"));
        coordinator.open_modal(ModalTemplate::SaveView, SaveMode::for_tab(&tab));
        assert_eq!(coordinator.mode(), SaveMode::Create);

        let mut form = SaveForm::prefill(&tab, coordinator.mode());
        assert_eq!(form, SaveForm::default());
        form.name = "first view".to_string();
        form.version = "1.0.0".to_string();

        coordinator.submit(&mut tab, &form).await.unwrap();

        assert_eq!(tab.name, "first view");
        assert!(!tab.unsaved);
        let WorkbenchEvent::ViewUpdated(committed) = receiver.try_recv().unwrap();
        assert_eq!(committed.name, "first view");
    }

    #[test]
    fn forms_integration() {
        let tab = Tab::new("over time").with_unsaved(true);
        assert_eq!(SaveMode::for_tab(&tab), SaveMode::Update);

        let snippet = SnippetForm::suggested(&tab.name);
        assert_eq!(snippet.name, "over_time");
    }
}
