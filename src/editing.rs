//! Inline editing of transfer conditions.
//!
//! Each conditional edge owns an [`EdgeEditor`]. Editors are independent: any
//! number of edges may be in the editing state at the same time.

use tracing::trace;

use crate::graph::{CallGraph, EdgeId, EdgePayload};

/// What an idle edge shows on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeLabel {
    /// The edge's current description.
    Description(String),
    /// The edge has no description yet; show the add affordance.
    AddCondition,
}

impl EdgeLabel {
    pub fn for_payload(payload: &EdgePayload) -> Self {
        if payload.description.is_empty() {
            EdgeLabel::AddCondition
        } else {
            EdgeLabel::Description(payload.description.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeEditState {
    Idle,
    Editing {
        /// values before editing started, restored on cancel
        original: EdgePayload,
        /// text being typed
        draft: EdgePayload,
    },
}

/// Per-edge editing state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEditor {
    edge_id: EdgeId,
    state: EdgeEditState,
}

impl EdgeEditor {
    pub fn new(edge_id: impl Into<EdgeId>) -> Self {
        Self {
            edge_id: edge_id.into(),
            state: EdgeEditState::Idle,
        }
    }

    pub fn edge_id(&self) -> &str {
        &self.edge_id
    }

    pub fn state(&self) -> &EdgeEditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EdgeEditState::Editing { .. })
    }

    /// In-progress text, when editing.
    pub fn draft(&self) -> Option<&EdgePayload> {
        match &self.state {
            EdgeEditState::Editing { draft, .. } => Some(draft),
            EdgeEditState::Idle => None,
        }
    }

    /// Enters editing with `current` as both the original and the draft.
    ///
    /// Returns `false` when already editing; the draft is kept.
    pub fn begin(
        &mut self,
        current: &EdgePayload,
    ) -> bool {
        if self.is_editing() {
            return false;
        }
        trace!("editing::begin({})", self.edge_id);
        self.state = EdgeEditState::Editing {
            original: current.clone(),
            draft: current.clone(),
        };
        true
    }

    pub fn set_description(
        &mut self,
        text: impl Into<String>,
    ) -> bool {
        match &mut self.state {
            EdgeEditState::Editing { draft, .. } => {
                draft.description = text.into();
                true
            }
            EdgeEditState::Idle => false,
        }
    }

    pub fn set_message(
        &mut self,
        text: impl Into<String>,
    ) -> bool {
        match &mut self.state {
            EdgeEditState::Editing { draft, .. } => {
                draft.message = text.into();
                true
            }
            EdgeEditState::Idle => false,
        }
    }

    /// Discards the draft and returns to idle, yielding the pre-edit values.
    pub fn cancel(&mut self) -> Option<EdgePayload> {
        match std::mem::replace(&mut self.state, EdgeEditState::Idle) {
            EdgeEditState::Editing { original, .. } => {
                trace!("editing::cancel({})", self.edge_id);
                Some(original)
            }
            EdgeEditState::Idle => None,
        }
    }

    /// Writes the draft to `graph` and returns to idle.
    ///
    /// Returns whether the graph changed.
    pub fn commit(
        &mut self,
        graph: &mut CallGraph,
    ) -> bool {
        match std::mem::replace(&mut self.state, EdgeEditState::Idle) {
            EdgeEditState::Editing { draft, .. } => {
                trace!("editing::commit({})", self.edge_id);
                graph.update_edge(&self.edge_id, draft)
            }
            EdgeEditState::Idle => false,
        }
    }

    /// Label to render for the edge while idle.
    pub fn label(
        &self,
        graph: &CallGraph,
    ) -> EdgeLabel {
        let payload = graph.edge(&self.edge_id).and_then(|e| e.payload()).cloned().unwrap_or_default();
        EdgeLabel::for_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AgentNode;

    fn graph() -> (CallGraph, EdgeId, EdgeId) {
        let mut graph = CallGraph::default();
        graph.add_agent_node(AgentNode::new("A", "Alice"));
        graph.add_agent_node(AgentNode::new("B", "Bob"));
        let ab = graph.connect("A", "B").unwrap();
        let ba = graph.add_edge("B", "A", EdgePayload::new("wants billing", "")).unwrap();
        (graph, ab, ba)
    }

    #[test]
    fn test_empty_edge_shows_add_affordance() {
        let (graph, ab, ba) = graph();
        assert_eq!(EdgeEditor::new(ab).label(&graph), EdgeLabel::AddCondition);
        assert_eq!(EdgeEditor::new(ba).label(&graph), EdgeLabel::Description("wants billing".into()));
    }

    #[test]
    fn test_commit_writes_both_fields() {
        let (mut graph, ab, _) = graph();
        let mut editor = EdgeEditor::new(ab.clone());
        assert!(editor.begin(&EdgePayload::default()));
        editor.set_description("wants sales");
        editor.set_message("transferring");
        assert!(editor.commit(&mut graph));
        assert_eq!(editor.state(), &EdgeEditState::Idle);
        assert_eq!(graph.edge(&ab).unwrap().payload().unwrap(), &EdgePayload::new("wants sales", "transferring"));
    }

    #[test]
    fn test_cancel_restores_original() {
        let (mut graph, _, ba) = graph();
        let current = graph.edge(&ba).unwrap().payload().unwrap().clone();
        let mut editor = EdgeEditor::new(ba.clone());
        editor.begin(&current);
        editor.set_description("something else");
        assert_eq!(editor.draft().unwrap().description, "something else");

        assert_eq!(editor.cancel(), Some(current.clone()));
        assert!(!editor.is_editing());
        assert!(!editor.commit(&mut graph));
        assert_eq!(graph.edge(&ba).unwrap().payload().unwrap(), &current);
    }

    #[test]
    fn test_typing_while_idle_is_ignored() {
        let mut editor = EdgeEditor::new("e-1-A-B");
        assert!(!editor.set_description("ignored"));
        assert!(!editor.set_message("ignored"));
        assert_eq!(editor.cancel(), None);
        assert_eq!(editor.state().as_ref(), "idle");
    }

    #[test]
    fn test_begin_twice_keeps_draft() {
        let mut editor = EdgeEditor::new("e-1-A-B");
        editor.begin(&EdgePayload::default());
        editor.set_description("draft");
        assert!(!editor.begin(&EdgePayload::default()));
        assert_eq!(editor.draft().unwrap().description, "draft");
        assert_eq!(editor.state().as_ref(), "editing");
    }

    #[test]
    fn test_edges_edit_concurrently() {
        let (mut graph, ab, ba) = graph();
        let mut first = EdgeEditor::new(ab.clone());
        let mut second = EdgeEditor::new(ba.clone());
        first.begin(&EdgePayload::default());
        second.begin(&EdgePayload::new("wants billing", ""));
        assert!(first.is_editing() && second.is_editing());

        first.set_description("wants sales");
        second.set_message("one moment");
        assert!(second.commit(&mut graph));
        assert!(first.is_editing());
        assert!(first.commit(&mut graph));

        assert_eq!(graph.edge(&ab).unwrap().payload().unwrap().description, "wants sales");
        assert_eq!(graph.edge(&ba).unwrap().payload().unwrap(), &EdgePayload::new("wants billing", "one moment"));
    }
}
