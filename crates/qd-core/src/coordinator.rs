//! View persistence coordinator
//!
//! The central piece of the save workflow:
//! - Records the create-vs-update decision when a dialog opens
//! - Validates the form, then dispatches on the recorded mode
//! - Applies optimistic local mutation around the remote call
//! - Rolls back the steps code (and nothing else) when an update fails
//! - Emits one workbench event per committed submission

use crate::config::WorkbenchConfig;
use crate::error::WorkflowError;
use crate::form::{SaveForm, SaveMode, SnippetForm};
use crate::services::{
    CodeRewriter, ModalHost, ModalSession, ModalTemplate, NotificationKind, Notifier,
    SnippetRegistry, StoreError, ViewStore,
};
use crate::tab::Tab;
use crate::validation::FormValidationGate;
use qd_view::{MetadataReconciler, View, ViewSteps, ViewType};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events the workflow emits to the surrounding editor shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchEvent {
    /// A view was saved or updated; carries the tab in its committed state
    ViewUpdated(Tab),
}

/// Collaborators handed to the coordinator at construction
#[derive(Clone)]
pub struct Collaborators {
    /// Remote view persistence
    pub store: Arc<dyn ViewStore>,
    /// Code rewriter applied before persisting
    pub rewriter: Arc<dyn CodeRewriter>,
    /// User notifications
    pub notifier: Arc<dyn Notifier>,
    /// Snippet storage and uniqueness lookup
    pub snippets: Arc<dyn SnippetRegistry>,
    /// Modal dialog host
    pub modal_host: Arc<dyn ModalHost>,
}

/// Coordinates saving and updating views for one editor surface
///
/// Holds the recorded [`SaveMode`] and the active dialog handle between
/// open and submit. One coordinator serves one tab strip.
pub struct ViewPersistenceCoordinator {
    store: Arc<dyn ViewStore>,
    rewriter: Arc<dyn CodeRewriter>,
    notifier: Arc<dyn Notifier>,
    snippets: Arc<dyn SnippetRegistry>,
    modal_host: Arc<dyn ModalHost>,
    gate: FormValidationGate,
    reconciler: MetadataReconciler,
    events: mpsc::UnboundedSender<WorkbenchEvent>,
    mode: SaveMode,
    active_modal: Option<Box<dyn ModalSession>>,
}

impl ViewPersistenceCoordinator {
    /// Create a coordinator
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        events: mpsc::UnboundedSender<WorkbenchEvent>,
        config: WorkbenchConfig,
    ) -> Self {
        let Collaborators {
            store,
            rewriter,
            notifier,
            snippets,
            modal_host,
        } = collaborators;
        let gate = FormValidationGate::new(Arc::clone(&snippets), &config);

        Self {
            store,
            rewriter,
            notifier,
            snippets,
            modal_host,
            gate,
            reconciler: MetadataReconciler::new(),
            events,
            mode: SaveMode::Create,
            active_modal: None,
        }
    }

    /// Currently recorded create-vs-update mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    /// Re-derive the mode when the active tab changes
    pub fn set_mode_for_tab(&mut self, tab: &Tab) {
        self.mode = SaveMode::for_tab(tab);
    }

    /// Open a dialog, recording the mode for the eventual submission
    ///
    /// The mode recorded here is what [`Self::submit`] dispatches on, even
    /// if the tab's state changes while the dialog is open.
    pub fn open_modal(&mut self, template: ModalTemplate, mode: SaveMode) {
        self.mode = mode;
        self.active_modal = Some(self.modal_host.open(template));
    }

    /// Close and drop the active dialog, if any
    pub fn close_active_modal(&mut self) {
        if let Some(modal) = self.active_modal.take() {
            modal.close();
        }
    }

    /// Submit the save-view form for `tab`
    ///
    /// # Workflow
    /// 1. Run the validation gate; violations stop everything here
    /// 2. Dispatch on the recorded mode: create a new view or update in place
    ///
    /// # Errors
    /// * [`WorkflowError::Validation`] - form violations, nothing touched
    /// * [`WorkflowError::MissingView`] - update mode with no attached view
    /// * [`WorkflowError::Metadata`] - stored metadata failed to reconcile
    /// * [`WorkflowError::Persistence`] - the store rejected the request
    pub async fn submit(&mut self, tab: &mut Tab, form: &SaveForm) -> Result<(), WorkflowError> {
        self.gate.validate_save_form(form)?;

        match self.mode {
            SaveMode::Create => self.save_view(tab, form).await,
            SaveMode::Update => self.update_view(tab, form).await,
        }
    }

    /// Persist a brand-new view from the tab's editor state
    ///
    /// The tab is only mutated after the store accepts the view: on failure
    /// it is left exactly as it was.
    async fn save_view(&mut self, tab: &mut Tab, form: &SaveForm) -> Result<(), WorkflowError> {
        // Fresh artifact: metadata comes from declarations alone
        let metadata = self
            .reconciler
            .reconcile(None, Some(tab.declared_parameters()))?;
        let code = self.rewriter.rewrite_for_persistence(&tab.editor.code);

        // New views are query-typed; the steps keep the previous view's
        // type when the tab was opened from one
        let step_type = tab
            .view
            .as_ref()
            .map_or(ViewType::Query, |view| view.view_type);

        let view = View::new(
            form.name.clone(),
            form.version.clone(),
            ViewType::Query,
            ViewSteps::new(code, step_type),
            form.description.clone(),
        )
        .with_metadata(metadata);

        tracing::debug!("Saving view {}", view.name);
        match self.store.create_view(&view).await {
            Ok(()) => {
                tab.view = Some(view);
                tab.name = form.name.clone();
                self.commit(tab, "view saved");
                Ok(())
            }
            Err(error) => {
                self.notify_failure("saving view failed", &error);
                Err(error.into())
            }
        }
    }

    /// Update the tab's attached view in place
    ///
    /// # Workflow
    /// 1. Snapshot the steps code for rollback
    /// 2. Apply description and version from the form (the name is never
    ///    applied; it is the identity key)
    /// 3. Reconcile stored metadata with the current declarations; a parse
    ///    failure aborts here, before the steps are touched
    /// 4. Replace the steps code with the rewritten editor code
    /// 5. Persist; on rejection, restore only the steps code
    async fn update_view(&mut self, tab: &mut Tab, form: &SaveForm) -> Result<(), WorkflowError> {
        let view = match tab.view.as_mut() {
            Some(view) => view,
            None => return Err(WorkflowError::MissingView(tab.id)),
        };

        // Rollback snapshot. Only the steps code is ever restored;
        // description, version, and metadata keep their new values.
        let previous_code = view.steps.code.clone();

        view.description = form.description.clone();
        view.version = form.version.clone();

        let declared = tab.editor.declared_parameters_for(Some(view.view_type));
        view.metadata = Some(
            self.reconciler
                .reconcile(view.metadata.as_deref(), Some(declared))?,
        );
        view.steps.code = self.rewriter.rewrite_for_persistence(&tab.editor.code);

        tracing::debug!("Updating view {}", view.name);
        match self.store.update_view(view).await {
            Ok(()) => {
                self.commit(tab, "view updated");
                Ok(())
            }
            Err(error) => {
                self.notify_failure("updating view failed", &error);
                view.steps.code = previous_code;
                Err(error.into())
            }
        }
    }

    /// Validate the snippet form and store the tab's code under its name
    ///
    /// # Errors
    /// [`WorkflowError::Validation`] on violations, including a name that
    /// collides with a stored snippet
    pub fn save_snippet(&mut self, tab: &Tab, form: &SnippetForm) -> Result<(), WorkflowError> {
        self.gate.validate_snippet_form(form)?;

        self.snippets.save(&form.name, &tab.editor.code);
        tracing::info!("Snippet {} saved", form.name);
        self.close_active_modal();
        Ok(())
    }

    /// Commit bookkeeping shared by both success paths
    fn commit(&mut self, tab: &mut Tab, message: &str) {
        tab.unsaved = false;
        self.emit(WorkbenchEvent::ViewUpdated(tab.clone()));
        self.notifier.notify(NotificationKind::Success, message, None);
        tracing::info!("{} ({})", message, tab.name);
        self.close_active_modal();
    }

    fn notify_failure(&self, message: &str, error: &StoreError) {
        tracing::error!("{}: {}", message, error);
        let payload = error.payload().to_string();
        self.notifier
            .notify(NotificationKind::Error, message, Some(&payload));
    }

    fn emit(&self, event: WorkbenchEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Workbench event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        InMemorySnippetRegistry, MockCodeRewriter, MockModalHost, MockNotifier, MockViewStore,
    };
    use crate::tab::EditorState;
    use qd_view::{DeclaredParameter, DeclaredParameters};
    use serde_json::json;

    struct NoopSession;

    impl ModalSession for NoopSession {
        fn close(&self) {}
    }

    fn passthrough_rewriter() -> MockCodeRewriter {
        let mut rewriter = MockCodeRewriter::new();
        rewriter
            .expect_rewrite_for_persistence()
            .returning(|code| code.to_string());
        rewriter
    }

    fn noop_modal_host() -> MockModalHost {
        let mut host = MockModalHost::new();
        host.expect_open().returning(|_| Box::new(NoopSession));
        host
    }

    fn coordinator(
        store: MockViewStore,
        notifier: MockNotifier,
    ) -> (
        ViewPersistenceCoordinator,
        mpsc::UnboundedReceiver<WorkbenchEvent>,
    ) {
        let (events, receiver) = mpsc::unbounded_channel();
        let collaborators = Collaborators {
            store: Arc::new(store),
            rewriter: Arc::new(passthrough_rewriter()),
            notifier: Arc::new(notifier),
            snippets: Arc::new(InMemorySnippetRegistry::new()),
            modal_host: Arc::new(noop_modal_host()),
        };
        (
            ViewPersistenceCoordinator::new(collaborators, events, WorkbenchConfig::default()),
            receiver,
        )
    }

    fn editing_tab() -> Tab {
        let mut declared = DeclaredParameters::new();
        declared.insert("ehr_id".to_string(), DeclaredParameter::new());
        Tab::new("worklist").with_editor(
            EditorState::new("SELECT c FROM composition c").with_query_parameters(declared),
        )
    }

    #[tokio::test]
    async fn create_submission_goes_through_create_view() {
        let mut store = MockViewStore::new();
        store.expect_create_view().times(1).returning(|_| Ok(()));
        store.expect_update_view().times(0);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|kind, message, _| {
                *kind == NotificationKind::Success && message == "view saved"
            })
            .times(1)
            .return_const(());

        let (mut coordinator, mut events) = coordinator(store, notifier);
        let mut tab = editing_tab();

        coordinator
            .submit(&mut tab, &SaveForm::new("worklist", "desc", "1.0"))
            .await
            .unwrap();

        assert!(tab.view.is_some());
        assert!(!tab.unsaved);
        assert!(matches!(
            events.try_recv(),
            Ok(WorkbenchEvent::ViewUpdated(_))
        ));
    }

    #[tokio::test]
    async fn failure_notification_carries_raw_payload_detail() {
        let mut store = MockViewStore::new();
        store.expect_create_view().times(1).returning(|_| {
            Err(StoreError::Rejected {
                status: 409,
                payload: json!({"error": "name taken"}),
            })
        });
        store.expect_update_view().times(0);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|kind, message, detail| {
                *kind == NotificationKind::Error
                    && message == "saving view failed"
                    && detail.as_deref() == Some(r#"{"error":"name taken"}"#)
            })
            .times(1)
            .return_const(());

        let (mut coordinator, mut events) = coordinator(store, notifier);
        let mut tab = editing_tab();

        let result = coordinator
            .submit(&mut tab, &SaveForm::new("worklist", "", "1.0"))
            .await;

        assert!(matches!(result, Err(WorkflowError::Persistence(_))));
        assert!(tab.view.is_none());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_uses_recorded_mode_not_tab_state() {
        // Tab says "unsaved", but the dialog was opened in create mode
        let mut store = MockViewStore::new();
        store.expect_create_view().times(1).returning(|_| Ok(()));
        store.expect_update_view().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().return_const(());

        let (mut coordinator, _events) = coordinator(store, notifier);
        coordinator.open_modal(ModalTemplate::SaveView, SaveMode::Create);

        let mut tab = editing_tab().with_unsaved(true);
        coordinator
            .submit(&mut tab, &SaveForm::new("worklist", "", ""))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_form_stops_before_any_collaborator() {
        let mut store = MockViewStore::new();
        store.expect_create_view().times(0);
        store.expect_update_view().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let (mut coordinator, mut events) = coordinator(store, notifier);
        let mut tab = editing_tab();

        let result = coordinator.submit(&mut tab, &SaveForm::new("ab", "", "")).await;

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn update_without_view_is_rejected() {
        let mut store = MockViewStore::new();
        store.expect_create_view().times(0);
        store.expect_update_view().times(0);
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let (mut coordinator, _events) = coordinator(store, notifier);
        coordinator.open_modal(ModalTemplate::SaveView, SaveMode::Update);

        let mut tab = editing_tab();
        let result = coordinator
            .submit(&mut tab, &SaveForm::new("worklist", "", ""))
            .await;

        assert!(matches!(result, Err(WorkflowError::MissingView(id)) if id == tab.id));
    }

    #[test]
    fn mode_tracks_tab_changes() {
        let store = MockViewStore::new();
        let notifier = MockNotifier::new();
        let (mut coordinator, _events) = coordinator(store, notifier);

        assert_eq!(coordinator.mode(), SaveMode::Create);

        coordinator.set_mode_for_tab(&editing_tab().with_unsaved(true));
        assert_eq!(coordinator.mode(), SaveMode::Update);

        coordinator.set_mode_for_tab(&editing_tab());
        assert_eq!(coordinator.mode(), SaveMode::Create);
    }

    #[test]
    fn snippet_save_stores_code_and_closes_modal() {
        let store = MockViewStore::new();
        let notifier = MockNotifier::new();

        let (events, _receiver) = mpsc::unbounded_channel();
        let snippets = Arc::new(InMemorySnippetRegistry::new());
        let collaborators = Collaborators {
            store: Arc::new(store),
            rewriter: Arc::new(passthrough_rewriter()),
            notifier: Arc::new(notifier),
            snippets: snippets.clone(),
            modal_host: Arc::new(noop_modal_host()),
        };
        let mut coordinator =
            ViewPersistenceCoordinator::new(collaborators, events, WorkbenchConfig::default());

        let tab = editing_tab();
        coordinator.open_modal(ModalTemplate::SaveSnippet, SaveMode::Create);
        coordinator
            .save_snippet(&tab, &SnippetForm::new("worklist_snippet"))
            .unwrap();

        assert_eq!(
            snippets.get("worklist_snippet").as_deref(),
            Some("SELECT c FROM composition c")
        );
    }

    #[test]
    fn duplicate_snippet_name_is_rejected() {
        let store = MockViewStore::new();
        let notifier = MockNotifier::new();

        let (events, _receiver) = mpsc::unbounded_channel();
        let snippets = Arc::new(InMemorySnippetRegistry::new());
        snippets.save("taken", "earlier code");
        let collaborators = Collaborators {
            store: Arc::new(store),
            rewriter: Arc::new(passthrough_rewriter()),
            notifier: Arc::new(notifier),
            snippets: snippets.clone(),
            modal_host: Arc::new(noop_modal_host()),
        };
        let mut coordinator =
            ViewPersistenceCoordinator::new(collaborators, events, WorkbenchConfig::default());

        let result = coordinator.save_snippet(&editing_tab(), &SnippetForm::new("taken"));

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(snippets.get("taken").as_deref(), Some("earlier code"));
    }
}
