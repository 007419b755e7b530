//! Testing utilities for Querydesk workspace
//!
//! Shared fixtures and scripted collaborator fakes.

#![allow(missing_docs)]

use parking_lot::Mutex;
use qd_core::{
    CodeRewriter, Collaborators, EditorState, InMemorySnippetRegistry, ModalHost, ModalSession,
    ModalTemplate, NotificationKind, Notifier, StoreError, Tab, ViewPersistenceCoordinator,
    ViewStore, WorkbenchConfig, WorkbenchEvent,
};
use qd_view::{DeclaredParameter, DeclaredParameters, View, ViewSteps, ViewType};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn declared_params(entries: &[(&str, Option<&str>, Option<&str>)]) -> DeclaredParameters {
    entries
        .iter()
        .map(|(name, description, param_type)| {
            (
                (*name).to_string(),
                DeclaredParameter {
                    description: description.map(str::to_string),
                    param_type: param_type.map(str::to_string),
                },
            )
        })
        .collect()
}

pub fn create_test_view(name: &str) -> View {
    View::new(
        name,
        "1.0.0",
        ViewType::Query,
        ViewSteps::new("SELECT e FROM ehr e", ViewType::Query),
        "test view",
    )
}

pub fn create_saved_tab(name: &str) -> Tab {
    Tab::new(name)
        .with_view(create_test_view(name))
        .with_editor(EditorState::new("SELECT e FROM ehr e"))
}

pub fn create_scratch_tab(name: &str) -> Tab {
    Tab::new(name).with_editor(EditorState::new("SELECT 1"))
}

pub fn rejected(status: u16, payload: Value) -> StoreError {
    StoreError::Rejected { status, payload }
}

/// View store whose responses are scripted by the test.
///
/// Responses are consumed in order; once the queue is empty every call
/// succeeds. Calls are recorded whether they succeed or not.
#[derive(Debug, Default)]
pub struct ScriptedViewStore {
    responses: Mutex<VecDeque<Result<(), StoreError>>>,
    created: Mutex<Vec<View>>,
    updated: Mutex<Vec<View>>,
}

impl ScriptedViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(self, response: Result<(), StoreError>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn push_response(&self, response: Result<(), StoreError>) {
        self.responses.lock().push_back(response);
    }

    pub fn created(&self) -> Vec<View> {
        self.created.lock().clone()
    }

    pub fn updated(&self) -> Vec<View> {
        self.updated.lock().clone()
    }

    fn next_response(&self) -> Result<(), StoreError> {
        self.responses.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait::async_trait]
impl ViewStore for ScriptedViewStore {
    async fn create_view(&self, view: &View) -> Result<(), StoreError> {
        self.created.lock().push(view.clone());
        self.next_response()
    }

    async fn update_view(&self, view: &View) -> Result<(), StoreError> {
        self.updated.lock().push(view.clone());
        self.next_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    pub kind: NotificationKind,
    pub message: String,
    pub detail: Option<String>,
}

/// Notifier that records every notification it is handed.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<RecordedNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<RecordedNotification> {
        self.notifications.lock().clone()
    }

    pub fn errors(&self) -> Vec<RecordedNotification> {
        self.of_kind(NotificationKind::Error)
    }

    pub fn successes(&self) -> Vec<RecordedNotification> {
        self.of_kind(NotificationKind::Success)
    }

    fn of_kind(&self, kind: NotificationKind) -> Vec<RecordedNotification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str, detail: Option<&str>) {
        self.notifications.lock().push(RecordedNotification {
            kind,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}

/// Rewriter that hands code through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRewriter;

impl CodeRewriter for PassthroughRewriter {
    fn rewrite_for_persistence(&self, code: &str) -> String {
        code.to_string()
    }
}

/// Rewriter that prefixes code with a marker, making the rewrite observable.
#[derive(Debug, Clone)]
pub struct MarkingRewriter {
    pub marker: String,
}

impl MarkingRewriter {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }
}

impl CodeRewriter for MarkingRewriter {
    fn rewrite_for_persistence(&self, code: &str) -> String {
        format!("{}{}", self.marker, code)
    }
}

/// Modal host handing out sessions that only count their closes.
#[derive(Debug, Default)]
pub struct NullModalHost {
    opened: Mutex<Vec<ModalTemplate>>,
    closes: Arc<Mutex<usize>>,
}

impl NullModalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<ModalTemplate> {
        self.opened.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        *self.closes.lock()
    }
}

struct CountingSession {
    closes: Arc<Mutex<usize>>,
}

impl ModalSession for CountingSession {
    fn close(&self) {
        *self.closes.lock() += 1;
    }
}

impl ModalHost for NullModalHost {
    fn open(&self, template: ModalTemplate) -> Box<dyn ModalSession> {
        self.opened.lock().push(template);
        Box::new(CountingSession {
            closes: Arc::clone(&self.closes),
        })
    }
}

/// Everything a workflow test needs: the coordinator plus handles to all
/// of its fakes and the event receiver.
pub struct WorkflowFixture {
    pub coordinator: ViewPersistenceCoordinator,
    pub store: Arc<ScriptedViewStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub snippets: Arc<InMemorySnippetRegistry>,
    pub modal_host: Arc<NullModalHost>,
    pub events: mpsc::UnboundedReceiver<WorkbenchEvent>,
}

pub fn setup_workflow() -> WorkflowFixture {
    setup_workflow_with_store(ScriptedViewStore::new())
}

pub fn setup_workflow_with_store(store: ScriptedViewStore) -> WorkflowFixture {
    let store = Arc::new(store);
    let notifier = Arc::new(RecordingNotifier::new());
    let snippets = Arc::new(InMemorySnippetRegistry::new());
    let modal_host = Arc::new(NullModalHost::new());
    let (sender, events) = mpsc::unbounded_channel();

    let collaborators = Collaborators {
        store: store.clone(),
        rewriter: Arc::new(PassthroughRewriter),
        notifier: notifier.clone(),
        snippets: snippets.clone(),
        modal_host: modal_host.clone(),
    };
    let coordinator =
        ViewPersistenceCoordinator::new(collaborators, sender, WorkbenchConfig::new());

    WorkflowFixture {
        coordinator,
        store,
        notifier,
        snippets,
        modal_host,
        events,
    }
}
