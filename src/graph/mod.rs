//! Typed call graph: one entry node, agent nodes, and the edges between them.

pub mod edge;
mod flow;
mod graph;
pub mod node;

pub use edge::{ConditionalEdge, Edge, EdgeId, EdgePayload, UnconditionalEdge};
pub use flow::CallFlow;
pub use graph::CallGraph;
pub use node::{AgentNode, ENTRY_NODE_ID, EntryNode, Node, NodeId, Position};
