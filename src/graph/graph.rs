//! In-memory call graph edited by the orchestration editor.
//!
//! The graph keeps nodes and edges in insertion order. Every mutation is total:
//! an edit that would break a structural rule is ignored and reported through
//! the return value instead of an error, so repeated gestures in the editor can
//! never leave the graph in an invalid state.

use serde::Serialize;
use tracing::trace;

use crate::graph::{
    edge::{ConditionalEdge, Edge, EdgeId, EdgePayload},
    node::{AgentNode, ENTRY_NODE_ID, EntryNode, Node, NodeId, Position},
};

/// Editable call graph.
///
/// Invariants held by every mutation:
/// - exactly one entry node exists; it is listed before every agent
/// - agent node ids are unique and never equal the entry id
/// - at most one unconditional edge exists
/// - every edge references nodes present in the graph
/// - conditional edges join two distinct agent nodes, at most one per ordered pair
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CallGraph {
    entry: EntryNode,
    agents: Vec<AgentNode>,
    edges: Vec<Edge>,
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new(EntryNode::default())
    }
}

impl CallGraph {
    /// create a graph holding only the entry node
    pub fn new(entry: EntryNode) -> Self {
        Self {
            entry,
            agents: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Output a human-readable representation of the call graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Call Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.node_count(), self.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes() {
            match node {
                Node::Entry(entry) => lines.push(format!(
                    "[{}] entry (phone: {})",
                    ENTRY_NODE_ID,
                    entry.selected_phone_number().map(|p| p.number.as_str()).unwrap_or("none")
                )),
                Node::Agent(agent) => lines.push(format!("[{}] {}", agent.id, agent.label)),
            }
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for edge in self.edges.iter() {
            match edge {
                Edge::Unconditional(e) => lines.push(format!("{} --> {} (id: {})", ENTRY_NODE_ID, e.target, e.id)),
                Edge::Conditional(e) => lines.push(format!("{} --[{}]--> {} (id: {})", e.source, e.payload.description, e.target, e.id)),
            }
        }
        lines.push(String::new());

        lines.push("--- Graph Structure ---".to_string());
        for node in self.nodes() {
            let outgoing: Vec<&str> = self.edges.iter().filter(|e| e.source() == node.id()).map(|e| e.target()).collect();
            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", node.id()));
            } else {
                lines.push(format!("{} -> {}", node.id(), outgoing.join(", ")));
            }
        }

        lines.join("\n")
    }

    /// every node, entry first, then agents in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        std::iter::once(Node::Entry(&self.entry)).chain(self.agents.iter().map(Node::Agent))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        1 + self.agents.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// get the entry node
    pub fn entry(&self) -> &EntryNode {
        &self.entry
    }

    /// iterate agent nodes in insertion order
    pub fn agents(&self) -> impl Iterator<Item = &AgentNode> {
        self.agents.iter()
    }

    /// get node by id
    pub fn node(
        &self,
        id: &str,
    ) -> Option<Node<'_>> {
        if id == ENTRY_NODE_ID {
            return Some(Node::Entry(&self.entry));
        }
        self.agent(id).map(Node::Agent)
    }

    /// get agent node by id
    pub fn agent(
        &self,
        id: &str,
    ) -> Option<&AgentNode> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn contains_node(
        &self,
        id: &str,
    ) -> bool {
        self.node(id).is_some()
    }

    /// get edge by id
    pub fn edge(
        &self,
        id: &str,
    ) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    /// target of the entry node's edge, if connected
    pub fn entry_target(&self) -> Option<&str> {
        self.edges.iter().find_map(|e| match e {
            Edge::Unconditional(edge) => Some(edge.target.as_str()),
            Edge::Conditional(_) => None,
        })
    }

    /// outgoing conditional edges of a node, in edge order
    pub fn outgoing(
        &self,
        id: &str,
    ) -> impl Iterator<Item = &ConditionalEdge> {
        self.edges.iter().filter_map(move |e| match e {
            Edge::Conditional(edge) if edge.source == id => Some(edge),
            _ => None,
        })
    }

    /// Adds an agent node. Returns `false` when a node with the same id exists.
    pub fn add_agent_node(
        &mut self,
        agent: AgentNode,
    ) -> bool {
        if agent.id == ENTRY_NODE_ID || self.contains_node(&agent.id) {
            trace!("graph::add_agent_node({}) ignored: duplicate id", agent.id);
            return false;
        }
        trace!("graph::add_agent_node({})", agent.id);
        self.agents.push(agent);
        true
    }

    /// Removes an agent node and every edge touching it.
    ///
    /// The entry node cannot be removed.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> bool {
        if id == ENTRY_NODE_ID {
            return false;
        }
        let Some(idx) = self.agents.iter().position(|a| a.id == id) else {
            return false;
        };
        self.agents.remove(idx);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        trace!("graph::remove_node({}) removed {} edges", id, before - self.edges.len());
        true
    }

    /// Connects `source` to `target` with an empty payload.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
    ) -> Option<EdgeId> {
        self.add_edge(source, target, EdgePayload::default())
    }

    /// Adds an edge between two nodes.
    ///
    /// An edge from the entry node becomes the single unconditional edge and its
    /// payload is discarded. Returns `None` without changing anything when:
    /// - the entry node already has an outgoing edge
    /// - either endpoint is missing, or the target is the entry node
    /// - source and target are the same node
    /// - an edge between the same ordered pair already exists
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        payload: EdgePayload,
    ) -> Option<EdgeId> {
        if source == target || self.agent(target).is_none() {
            trace!("graph::add_edge({} -> {}) ignored: invalid target", source, target);
            return None;
        }

        let edge = if source == ENTRY_NODE_ID {
            if self.entry_target().is_some() {
                trace!("graph::add_edge({} -> {}) ignored: entry already connected", source, target);
                return None;
            }
            Edge::unconditional(target)
        } else {
            if self.agent(source).is_none() {
                trace!("graph::add_edge({} -> {}) ignored: unknown source", source, target);
                return None;
            }
            Edge::conditional(source, target, payload)
        };

        if self.find_edge(source, target).is_some() {
            trace!("graph::add_edge({} -> {}) ignored: duplicate edge", source, target);
            return None;
        }

        let id = edge.id().to_string();
        trace!("graph::add_edge({})", id);
        self.edges.push(edge);
        Some(id)
    }

    /// Removes one edge by id.
    pub fn remove_edge(
        &mut self,
        id: &str,
    ) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id() != id);
        before != self.edges.len()
    }

    /// Replaces the payload of a conditional edge.
    ///
    /// Returns `false` for unknown ids, unconditional edges, and payloads equal
    /// to the current one.
    pub fn update_edge(
        &mut self,
        id: &str,
        payload: EdgePayload,
    ) -> bool {
        let edge = self.edges.iter_mut().find_map(|e| match e {
            Edge::Conditional(edge) if edge.id == id => Some(edge),
            _ => None,
        });
        match edge {
            Some(edge) if edge.payload != payload => {
                trace!("graph::update_edge({})", id);
                edge.payload = payload;
                true
            }
            _ => false,
        }
    }

    /// Selects one of the entry node's phone numbers, or clears the selection.
    ///
    /// Ids outside the assignable list are ignored.
    pub fn select_phone_number(
        &mut self,
        phone_number_id: Option<&str>,
    ) -> bool {
        let entry = &mut self.entry;
        if let Some(id) = phone_number_id {
            if !entry.phone_numbers.iter().any(|p| p.id == id) {
                return false;
            }
        }
        let next = phone_number_id.map(str::to_string);
        if entry.selected_phone_number_id == next {
            return false;
        }
        entry.selected_phone_number_id = next;
        true
    }

    pub fn set_position(
        &mut self,
        id: &str,
        position: Position,
    ) -> bool {
        if id == ENTRY_NODE_ID {
            self.entry.position = position;
            return true;
        }
        match self.agents.iter_mut().find(|a| a.id == id) {
            Some(agent) => {
                agent.position = position;
                true
            }
            None => false,
        }
    }

    /// ids of every agent node, in insertion order
    pub fn agent_ids(&self) -> Vec<NodeId> {
        self.agents().map(|a| a.id.clone()).collect()
    }

    /// edge joining `source` to `target`, if present
    pub fn find_edge(
        &self,
        source: &str,
        target: &str,
    ) -> Option<&Edge> {
        self.edges.iter().find(|e| e.source() == source && e.target() == target)
    }
}
