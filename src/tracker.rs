//! Change tracking for unsaved edits.
//!
//! A [`Snapshot`] captures the fields that decide whether a call flow needs
//! saving. The tracker compares the current snapshot against the baseline taken
//! at load or at the last successful save. Baselines are replaced wholesale and
//! never mutated.

use tracing::trace;

use crate::graph::CallFlow;

/// Identity and editable text of one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFingerprint {
    pub id: String,
    pub description: String,
    pub message: String,
}

/// Immutable view of the tracked fields of a call flow.
///
/// Edges are kept in graph order and compared as a list, so the same edges in
/// another order compare unequal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub phone_number_id: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub edges: Vec<EdgeFingerprint>,
}

impl Snapshot {
    pub fn capture(flow: &CallFlow) -> Self {
        let graph = &flow.graph;
        Self {
            name: flow.name.clone(),
            phone_number_id: graph.entry().selected_phone_number_id.clone(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            edges: graph
                .edges()
                .iter()
                .map(|e| {
                    let payload = e.payload().cloned().unwrap_or_default();
                    EdgeFingerprint {
                        id: e.id().to_string(),
                        description: payload.description,
                        message: payload.message,
                    }
                })
                .collect(),
        }
    }
}

/// Answers whether the current call flow differs from the baseline.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    baseline: Option<Snapshot>,
    dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the baseline and clears the dirty flag.
    pub fn reset(
        &mut self,
        snapshot: Snapshot,
    ) {
        trace!("tracker::reset(nodes={}, edges={})", snapshot.node_count, snapshot.edge_count);
        self.baseline = Some(snapshot);
        self.dirty = false;
    }

    /// Compares `current` against the baseline and returns the dirty flag.
    ///
    /// Before the first baseline exists nothing is compared and the flow is clean.
    pub fn observe(
        &mut self,
        current: &Snapshot,
    ) -> bool {
        if let Some(baseline) = self.baseline.as_ref() {
            self.dirty = baseline != current;
        }
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }
}
