//! Orchestration controller - the editor session for one call flow.
//!
//! The controller owns the call flow being edited, the dirty tracker and the
//! per-edge editors, and is the only component that talks to the persistence
//! collaborator. All edits are synchronous. Saving is the single asynchronous
//! operation and at most one save is in flight per controller.

mod exit;

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tokio::sync::watch;
use tracing::{trace, warn};

use crate::{
    Result, ShareLock, SquadflowError,
    common::Queue,
    editing::{EdgeEditState, EdgeEditor, EdgeLabel},
    events::Notification,
    graph::{AgentNode, CallFlow, EdgeId, EdgePayload, Position},
    layout::Leveling,
    model::{Agent, WorkflowRecord},
    serializer::WorkflowSerializer,
    store::WorkflowStore,
    tracker::{DirtyTracker, Snapshot},
};

pub use exit::{ExitChoice, ExitOutcome, ExitRequest, ExitState};

/// Outcome of a successful [`Controller::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SaveStatus {
    /// The record was persisted and the baseline replaced.
    Saved,
    /// Nothing changed since the last baseline; the store was not called.
    Unchanged,
    /// Another save is still running; this call did nothing.
    InFlight,
}

/// Editable state guarded by the controller's lock.
struct EditorState {
    flow: CallFlow,
    tracker: DirtyTracker,
    editors: HashMap<EdgeId, EdgeEditor>,
    exit: ExitState,
}

impl EditorState {
    fn refresh(&mut self) -> bool {
        let current = Snapshot::capture(&self.flow);
        self.tracker.observe(&current)
    }

    /// Drops editors whose edge no longer exists.
    fn prune_editors(&mut self) {
        let graph = &self.flow.graph;
        self.editors.retain(|id, _| graph.edge(id).is_some());
    }
}

/// Save lifecycle published to everyone waiting on the running save.
#[derive(Debug, Clone, PartialEq)]
enum SaveState {
    /// No save running; carries the error of the last finished save, if any.
    Idle { last_error: Option<SquadflowError> },
    Saving,
}

/// Returns the save state to idle when the save completes or its future is dropped.
struct SavingGuard<'a> {
    state: &'a watch::Sender<SaveState>,
    /// Reported as the outcome; left as is when the save future is dropped mid-call.
    error: Option<SquadflowError>,
}

impl<'a> SavingGuard<'a> {
    /// Claims the save slot, or returns `None` while another save runs.
    fn acquire(state: &'a watch::Sender<SaveState>) -> Option<Self> {
        let acquired = state.send_if_modified(|current| match current {
            SaveState::Saving => false,
            SaveState::Idle { .. } => {
                *current = SaveState::Saving;
                true
            }
        });
        acquired.then(|| Self {
            state,
            error: Some(SquadflowError::Editor("save cancelled".to_string())),
        })
    }

    fn settle(
        &mut self,
        error: Option<SquadflowError>,
    ) {
        self.error = error;
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(SaveState::Idle { last_error: self.error.take() });
    }
}

/// Editor session for a single call flow.
///
/// # Example
///
/// ```rust,ignore
/// let editor = EditorBuilder::new(store).client_id("client-1").open("wf-1").await?;
/// editor.connect("start", "agent-a");
/// if editor.is_dirty() {
///     editor.save().await?;
/// }
/// ```
pub struct Controller {
    client_id: String,
    store: Arc<dyn WorkflowStore>,
    serializer: WorkflowSerializer,
    /// Agents available to the client.
    agents: Vec<Agent>,
    state: ShareLock<EditorState>,
    /// Saving while a save call is outstanding.
    save_state: watch::Sender<SaveState>,
    notifications: Arc<Queue<Notification>>,
}

impl Controller {
    pub(crate) fn new(
        client_id: String,
        store: Arc<dyn WorkflowStore>,
        serializer: WorkflowSerializer,
        agents: Vec<Agent>,
        flow: CallFlow,
        notification_capacity: usize,
    ) -> Self {
        let mut tracker = DirtyTracker::new();
        tracker.reset(Snapshot::capture(&flow));

        Self {
            client_id,
            store,
            serializer,
            agents,
            state: Arc::new(RwLock::new(EditorState {
                flow,
                tracker,
                editors: HashMap::new(),
                exit: ExitState::Editing,
            })),
            save_state: watch::Sender::new(SaveState::Idle { last_error: None }),
            notifications: Queue::new(notification_capacity),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, EditorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EditorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies an edit and re-evaluates the dirty flag.
    fn mutate<R>(
        &self,
        op: impl FnOnce(&mut EditorState) -> R,
    ) -> R {
        let mut state = self.write();
        let result = op(&mut state);
        state.refresh();
        result
    }

    fn notify(
        &self,
        notification: Notification,
    ) {
        if let Err(e) = self.notifications.send(notification) {
            warn!("controller::notify dropped notification: {}", e);
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn workflow_id(&self) -> String {
        self.read().flow.id.clone()
    }

    /// A copy of the call flow being edited.
    pub fn flow(&self) -> CallFlow {
        self.read().flow.clone()
    }

    /// The record a save would persist right now.
    pub fn record(&self) -> WorkflowRecord {
        WorkflowSerializer::serialize(&self.read().flow)
    }

    /// Agents available to the client.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Client agents not yet placed on the canvas.
    pub fn available_agents(&self) -> Vec<Agent> {
        let state = self.read();
        self.agents.iter().filter(|a| !state.flow.graph.contains_node(&a.platform_id)).cloned().collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.read().tracker.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        matches!(*self.save_state.borrow(), SaveState::Saving)
    }

    /// Waits until no save is running and returns the error of the last
    /// finished save, or `None` when it succeeded.
    pub async fn wait_for_save(&self) -> Option<SquadflowError> {
        let mut rx = self.save_state.subscribe();
        let last_error = match rx.wait_for(|s| !matches!(s, SaveState::Saving)).await {
            Ok(state) => match &*state {
                SaveState::Idle { last_error } => last_error.clone(),
                SaveState::Saving => None,
            },
            Err(_) => None,
        };
        last_error
    }

    /// Baseline taken at load or at the last successful save.
    pub fn baseline(&self) -> Option<Snapshot> {
        self.read().tracker.baseline().cloned()
    }

    /// Queue of user-visible notifications, drained by the host.
    pub fn notifications(&self) -> Arc<Queue<Notification>> {
        self.notifications.clone()
    }

    pub fn rename(
        &self,
        name: impl Into<String>,
    ) -> bool {
        let name = name.into();
        trace!("controller::rename({})", name);
        self.mutate(|state| {
            if state.flow.name == name {
                return false;
            }
            state.flow.name = name;
            true
        })
    }

    pub fn select_phone_number(
        &self,
        phone_number_id: Option<&str>,
    ) -> bool {
        trace!("controller::select_phone_number({:?})", phone_number_id);
        self.mutate(|state| state.flow.graph.select_phone_number(phone_number_id))
    }

    /// Places a client agent on the canvas below the existing agents.
    ///
    /// Unknown agents and agents already on the canvas are ignored.
    pub fn add_agent(
        &self,
        platform_id: &str,
    ) -> bool {
        trace!("controller::add_agent({})", platform_id);
        let Some(agent) = self.agents.iter().find(|a| a.platform_id == platform_id) else {
            return false;
        };
        self.mutate(|state| {
            let position = self.serializer.layout().next_free_position(&state.flow.graph);
            state.flow.graph.add_agent_node(AgentNode::from(agent).at(position))
        })
    }

    /// Removes an agent and every edge touching it.
    pub fn remove_node(
        &self,
        id: &str,
    ) -> bool {
        trace!("controller::remove_node({})", id);
        self.mutate(|state| {
            let removed = state.flow.graph.remove_node(id);
            state.prune_editors();
            removed
        })
    }

    pub fn connect(
        &self,
        source: &str,
        target: &str,
    ) -> Option<EdgeId> {
        trace!("controller::connect({} -> {})", source, target);
        self.mutate(|state| state.flow.graph.connect(source, target))
    }

    pub fn disconnect(
        &self,
        edge_id: &str,
    ) -> bool {
        trace!("controller::disconnect({})", edge_id);
        self.mutate(|state| {
            let removed = state.flow.graph.remove_edge(edge_id);
            state.prune_editors();
            removed
        })
    }

    pub fn update_edge(
        &self,
        edge_id: &str,
        payload: EdgePayload,
    ) -> bool {
        trace!("controller::update_edge({})", edge_id);
        self.mutate(|state| state.flow.graph.update_edge(edge_id, payload))
    }

    /// Moves a node on the canvas. Positions are not persisted.
    pub fn move_node(
        &self,
        id: &str,
        position: Position,
    ) -> bool {
        self.write().flow.graph.set_position(id, position)
    }

    /// Recomputes every node position.
    pub fn arrange(&self) -> Leveling {
        trace!("controller::arrange()");
        let mut state = self.write();
        self.serializer.layout().arrange(&mut state.flow.graph)
    }

    /// Starts editing the transfer condition of a conditional edge.
    pub fn begin_edge_edit(
        &self,
        edge_id: &str,
    ) -> bool {
        let mut state = self.write();
        let Some(payload) = state.flow.graph.edge(edge_id).and_then(|e| e.payload()).cloned() else {
            return false;
        };
        state.editors.entry(edge_id.to_string()).or_insert_with(|| EdgeEditor::new(edge_id)).begin(&payload)
    }

    pub fn edit_edge_description(
        &self,
        edge_id: &str,
        text: impl Into<String>,
    ) -> bool {
        let mut state = self.write();
        state.editors.get_mut(edge_id).map(|editor| editor.set_description(text)).unwrap_or(false)
    }

    pub fn edit_edge_message(
        &self,
        edge_id: &str,
        text: impl Into<String>,
    ) -> bool {
        let mut state = self.write();
        state.editors.get_mut(edge_id).map(|editor| editor.set_message(text)).unwrap_or(false)
    }

    /// Writes the draft of an edge to the graph and returns the edge to idle.
    pub fn commit_edge_edit(
        &self,
        edge_id: &str,
    ) -> bool {
        self.mutate(|state| {
            let EditorState { flow, editors, .. } = state;
            editors.get_mut(edge_id).map(|editor| editor.commit(&mut flow.graph)).unwrap_or(false)
        })
    }

    /// Discards the draft of an edge, yielding the restored values.
    pub fn cancel_edge_edit(
        &self,
        edge_id: &str,
    ) -> Option<EdgePayload> {
        self.write().editors.get_mut(edge_id).and_then(EdgeEditor::cancel)
    }

    pub fn edge_edit_state(
        &self,
        edge_id: &str,
    ) -> EdgeEditState {
        self.read().editors.get(edge_id).map(|e| e.state().clone()).unwrap_or(EdgeEditState::Idle)
    }

    /// Label an idle edge shows, or `None` for unknown and unconditional edges.
    pub fn edge_label(
        &self,
        edge_id: &str,
    ) -> Option<EdgeLabel> {
        let state = self.read();
        state.flow.graph.edge(edge_id).and_then(|e| e.payload()).map(EdgeLabel::for_payload)
    }

    /// Persists the current call flow.
    ///
    /// On success the baseline becomes the saved state. On failure the flow and
    /// the dirty flag are left untouched and an error notification is raised;
    /// nothing is retried.
    pub async fn save(&self) -> Result<SaveStatus> {
        let Some(mut guard) = SavingGuard::acquire(&self.save_state) else {
            trace!("controller::save() ignored: save in flight");
            return Ok(SaveStatus::InFlight);
        };

        let (workflow_id, record, snapshot) = {
            let state = self.read();
            if !state.tracker.is_dirty() {
                guard.settle(None);
                return Ok(SaveStatus::Unchanged);
            }
            (state.flow.id.clone(), WorkflowSerializer::serialize(&state.flow), Snapshot::capture(&state.flow))
        };

        trace!("controller::save({})", workflow_id);
        let result = match self.store.save_workflow(&workflow_id, &record).await {
            Ok(receipt) if receipt.success => Ok(()),
            Ok(receipt) => Err(SquadflowError::Store(receipt.error.unwrap_or_else(|| format!("failed to save workflow {}", workflow_id)))),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                let mut state = self.write();
                state.tracker.reset(snapshot);
                // edits made while the call was outstanding are still unsaved
                state.refresh();
                drop(state);
                guard.settle(None);
                self.notify(Notification::success(format!("Saved {}", record.name)));
                Ok(SaveStatus::Saved)
            }
            Err(e) => {
                warn!("controller::save({}) failed: {}", workflow_id, e);
                self.notify(Notification::error(format!("Failed to save {}: {}", record.name, e)));
                guard.settle(Some(e.clone()));
                Err(e)
            }
        }
    }
}
