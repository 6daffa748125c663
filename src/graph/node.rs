//! Node definitions for the call graph.
//!
//! A call graph holds exactly one entry node, bound to a phone number, and
//! any number of agent nodes keyed by the agent's platform id.

use serde::{Deserialize, Serialize};

use crate::model::{Agent, PhoneNumber};

/// node id
pub type NodeId = String;

/// Fixed id of the entry node.
pub const ENTRY_NODE_ID: &str = "start";

/// Canvas coordinates of a node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self { x, y }
    }
}

/// The starting point of a call flow.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EntryNode {
    /// Phone numbers the operator may bind to this flow.
    pub phone_numbers: Vec<PhoneNumber>,
    /// Currently selected phone number id.
    pub selected_phone_number_id: Option<String>,
    pub position: Position,
}

impl EntryNode {
    pub fn new(
        phone_numbers: Vec<PhoneNumber>,
        selected_phone_number_id: Option<String>,
    ) -> Self {
        Self {
            phone_numbers,
            selected_phone_number_id,
            position: Position::default(),
        }
    }

    /// The selected phone number, if it is one of the assignable numbers.
    pub fn selected_phone_number(&self) -> Option<&PhoneNumber> {
        let selected = self.selected_phone_number_id.as_deref()?;
        self.phone_numbers.iter().find(|p| p.id == selected)
    }
}

/// A voice agent participating in the call flow.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AgentNode {
    /// node id, equal to the agent's platform id
    pub id: NodeId,
    /// display label
    pub label: String,
    /// platform id of the agent
    pub platform_id: String,
    pub position: Position,
}

impl AgentNode {
    pub fn new(
        platform_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let platform_id = platform_id.into();
        Self {
            id: platform_id.clone(),
            label: label.into(),
            platform_id,
            position: Position::default(),
        }
    }

    pub fn at(
        mut self,
        position: Position,
    ) -> Self {
        self.position = position;
        self
    }
}

impl From<&Agent> for AgentNode {
    fn from(agent: &Agent) -> Self {
        AgentNode::new(agent.platform_id.clone(), agent.name.clone())
    }
}

/// Borrowed view of one node of the call graph.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node<'a> {
    Entry(&'a EntryNode),
    Agent(&'a AgentNode),
}

impl<'a> Node<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Node::Entry(_) => ENTRY_NODE_ID,
            Node::Agent(agent) => &agent.id,
        }
    }

    pub fn position(&self) -> Position {
        match *self {
            Node::Entry(entry) => entry.position,
            Node::Agent(agent) => agent.position,
        }
    }

    pub fn as_agent(&self) -> Option<&'a AgentNode> {
        match *self {
            Node::Agent(agent) => Some(agent),
            Node::Entry(_) => None,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, Node::Entry(_))
    }
}
