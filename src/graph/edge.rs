//! Edge definitions for connecting nodes.
//!
//! The entry node routes unconditionally to a single first agent. Agents hand
//! calls to each other through conditional edges carrying a trigger description
//! and the message spoken during the transfer.

use serde::{Deserialize, Serialize};

use crate::graph::node::{ENTRY_NODE_ID, NodeId};

/// Unique identifier for an edge within a call graph.
pub type EdgeId = String;

/// Builds the id of the edge from `source` to `target`.
///
/// Node ids may contain `-`, so the source length is encoded to keep ids of
/// distinct ordered pairs distinct: `a-b -> c` is `e-3-a-b-c` and `a -> b-c`
/// is `e-1-a-b-c`.
pub fn edge_id(
    source: &str,
    target: &str,
) -> EdgeId {
    format!("e-{}-{}-{}", source.len(), source, target)
}

/// Editable text carried by a conditional edge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePayload {
    /// When the transfer should happen.
    #[serde(default)]
    pub description: String,
    /// What the agent says while transferring.
    #[serde(default)]
    pub message: String,
}

impl EdgePayload {
    pub fn new(
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.message.is_empty()
    }
}

/// Edge from the entry node to the first agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnconditionalEdge {
    pub id: EdgeId,
    pub target: NodeId,
}

/// Transfer rule between two agents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConditionalEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub payload: EdgePayload,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Edge {
    Unconditional(UnconditionalEdge),
    Conditional(ConditionalEdge),
}

impl Edge {
    pub(crate) fn unconditional(target: &str) -> Self {
        Edge::Unconditional(UnconditionalEdge {
            id: edge_id(ENTRY_NODE_ID, target),
            target: target.to_string(),
        })
    }

    pub(crate) fn conditional(
        source: &str,
        target: &str,
        payload: EdgePayload,
    ) -> Self {
        Edge::Conditional(ConditionalEdge {
            id: edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            payload,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Edge::Unconditional(edge) => &edge.id,
            Edge::Conditional(edge) => &edge.id,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Edge::Unconditional(_) => ENTRY_NODE_ID,
            Edge::Conditional(edge) => &edge.source,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Edge::Unconditional(edge) => &edge.target,
            Edge::Conditional(edge) => &edge.target,
        }
    }

    /// Payload of a conditional edge; unconditional edges carry none.
    pub fn payload(&self) -> Option<&EdgePayload> {
        match self {
            Edge::Unconditional(_) => None,
            Edge::Conditional(edge) => Some(&edge.payload),
        }
    }

    pub fn touches(
        &self,
        node_id: &str,
    ) -> bool {
        self.source() == node_id || self.target() == node_id
    }
}
