//! Bidirectional mapping between workflow records and call flows.
//!
//! Deserializing runs the layout engine to recover positions and edges, since a
//! record carries neither. Serializing resolves every edge target back to its
//! display name, the inverse of the lookup done on load.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::{
    graph::{AgentNode, CallFlow, CallGraph, ENTRY_NODE_ID, EntryNode},
    layout::LayoutEngine,
    model::{Agent, Destination, Member, PhoneNumber, WorkflowRecord},
};

#[derive(Debug, Clone, Default)]
pub struct WorkflowSerializer {
    layout: LayoutEngine,
}

impl WorkflowSerializer {
    pub fn new(layout: LayoutEngine) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Builds the editable call flow for a loaded record.
    ///
    /// The entry node offers `phone_numbers` and preselects the one assigned to
    /// this workflow, falling back to the record's own `phoneNumberId`.
    pub fn deserialize(
        &self,
        record: &WorkflowRecord,
        agents: &[Agent],
        phone_numbers: Vec<PhoneNumber>,
    ) -> CallFlow {
        trace!("serializer::deserialize({})", record.id);
        let plan = self.layout.plan(&record.members, agents);

        let selected = phone_numbers
            .iter()
            .find(|p| p.workflow_id.as_deref() == Some(record.id.as_str()))
            .or_else(|| {
                let id = record.phone_number_id.as_deref()?;
                phone_numbers.iter().find(|p| p.id == id)
            })
            .map(|p| p.id.clone());

        let mut entry = EntryNode::new(phone_numbers, selected);
        entry.position = plan.entry_position;

        let mut graph = CallGraph::new(entry);
        for agent in plan.agents {
            graph.add_agent_node(agent);
        }
        if let Some(root) = plan.entry_target.as_deref() {
            graph.connect(ENTRY_NODE_ID, root);
        }
        for transfer in plan.transfers {
            if graph.add_edge(&transfer.source, &transfer.target, transfer.payload).is_none() {
                warn!("serializer::deserialize dropped transfer {} -> {}", transfer.source, transfer.target);
            }
        }

        CallFlow::new(record.id.clone(), record.name.clone(), graph)
    }

    /// Builds the workflow record for the current call flow.
    pub fn serialize(flow: &CallFlow) -> WorkflowRecord {
        trace!("serializer::serialize({})", flow.id);
        let graph = &flow.graph;

        let members = member_order(graph)
            .into_iter()
            .map(|agent| Member {
                assistant_id: agent.platform_id.clone(),
                assistant_destinations: graph
                    .outgoing(&agent.id)
                    .filter_map(|edge| {
                        let target = graph.agent(&edge.target)?;
                        Some(Destination::assistant(target.label.clone(), edge.payload.description.clone(), edge.payload.message.clone()))
                    })
                    .collect(),
            })
            .collect();

        let entry = graph.entry();
        let phone_number = entry.selected_phone_number().map(|p| p.number.clone());

        WorkflowRecord {
            id: flow.id.clone(),
            name: flow.name.clone(),
            phone_number,
            phone_number_id: entry.selected_phone_number_id.clone(),
            members,
        }
    }
}

/// Agents in graph order, with the entry target moved first when another agent
/// would otherwise be picked as root on the next load.
fn member_order(graph: &CallGraph) -> Vec<&AgentNode> {
    let mut agents: Vec<&AgentNode> = graph.agents().collect();
    let Some(entry_target) = graph.entry_target() else {
        return agents;
    };

    let targeted: HashSet<&str> = agents.iter().flat_map(|a| graph.outgoing(&a.id)).map(|e| e.target.as_str()).collect();
    let first_root = agents.iter().find(|a| !targeted.contains(a.id.as_str())).map(|a| a.id.as_str());
    if first_root == Some(entry_target) {
        return agents;
    }

    if let Some(idx) = agents.iter().position(|a| a.id == entry_target) {
        let agent = agents.remove(idx);
        agents.insert(0, agent);
    }
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgePayload};

    fn agents() -> Vec<Agent> {
        vec![Agent::new("A", "A", "Alice"), Agent::new("B", "B", "Bob"), Agent::new("C", "C", "Carol")]
    }

    fn record(members: Vec<Member>) -> WorkflowRecord {
        WorkflowRecord {
            id: "wf-1".into(),
            name: "Front desk".into(),
            phone_number: None,
            phone_number_id: None,
            members,
        }
    }

    #[test]
    fn test_deserialize_scenario() {
        let record = record(vec![Member {
            assistant_id: "A".into(),
            assistant_destinations: vec![Destination::assistant("Bob", "wants sales", "transferring")],
        }]);
        let agents = vec![Agent::new("A", "A", "Alice"), Agent::new("B", "B", "Bob")];
        let flow = WorkflowSerializer::default().deserialize(&record, &agents, vec![]);
        let graph = &flow.graph;

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.agent("A").unwrap().label, "Alice");
        assert_eq!(graph.agent("B").unwrap().label, "Bob");
        assert_eq!(graph.entry_target(), Some("A"));

        let Some(Edge::Conditional(edge)) = graph.find_edge("A", "B") else {
            panic!("expected conditional edge A -> B");
        };
        assert_eq!(edge.payload, EdgePayload::new("wants sales", "transferring"));

        let layout = LayoutEngine::default();
        assert_eq!(graph.agent("A").unwrap().position.y, layout.config().base_y);
        assert_eq!(graph.agent("B").unwrap().position.y, layout.config().base_y + layout.config().vertical_spacing);
        assert_eq!(graph.entry().position, layout.entry_position());
    }

    #[test]
    fn test_round_trip_acyclic_record() {
        let mut original = record(vec![
            Member {
                assistant_id: "A".into(),
                assistant_destinations: vec![
                    Destination::assistant("Bob", "wants sales", "transferring to sales"),
                    Destination::assistant("Carol", "wants support", ""),
                ],
            },
            Member {
                assistant_id: "B".into(),
                assistant_destinations: vec![Destination::assistant("Carol", "", "one moment")],
            },
            Member {
                assistant_id: "C".into(),
                assistant_destinations: vec![],
            },
        ]);
        original.phone_number = Some("+15550100".into());
        original.phone_number_id = Some("pn-1".into());
        let phones = vec![PhoneNumber::new("pn-1", "+15550100").assigned_to("wf-1"), PhoneNumber::new("pn-2", "+15550101")];

        let serializer = WorkflowSerializer::default();
        let flow = serializer.deserialize(&original, &agents(), phones);
        assert_eq!(WorkflowSerializer::serialize(&flow), original);
    }

    #[test]
    fn test_unresolved_destination_is_not_reemitted() {
        let original = record(vec![Member {
            assistant_id: "A".into(),
            assistant_destinations: vec![Destination::assistant("Zed", "unknown", ""), Destination::assistant("Bob", "", "")],
        }]);
        let flow = WorkflowSerializer::default().deserialize(&original, &agents(), vec![]);
        assert!(flow.graph.edges().iter().all(|e| e.target() != "Zed"));

        let saved = WorkflowSerializer::serialize(&flow);
        let names: Vec<&str> = saved.members[0].assistant_destinations.iter().map(|d| d.assistant_name.as_str()).collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn test_self_transfer_is_dropped() {
        let original = record(vec![
            Member {
                assistant_id: "A".into(),
                assistant_destinations: vec![Destination::assistant("Bob", "", "")],
            },
            Member {
                assistant_id: "B".into(),
                assistant_destinations: vec![Destination::assistant("Bob", "loop", "")],
            },
        ]);
        let flow = WorkflowSerializer::default().deserialize(&original, &agents(), vec![]);
        assert_eq!(flow.graph.edge_count(), 2);
        assert!(flow.graph.find_edge("B", "B").is_none());
    }

    #[test]
    fn test_duplicate_display_name_resolves_to_first_agent() {
        let agents = vec![Agent::new("A", "A", "Alice"), Agent::new("B", "B", "Sam"), Agent::new("C", "C", "Sam")];
        let original = record(vec![
            Member {
                assistant_id: "A".into(),
                assistant_destinations: vec![Destination::assistant("Sam", "", "")],
            },
            Member {
                assistant_id: "C".into(),
                assistant_destinations: vec![],
            },
        ]);
        let flow = WorkflowSerializer::default().deserialize(&original, &agents, vec![]);
        assert!(flow.graph.find_edge("A", "B").is_some());
        assert!(flow.graph.find_edge("A", "C").is_none());
    }

    #[test]
    fn test_phone_selection_prefers_assignment() {
        let mut original = record(vec![]);
        original.phone_number_id = Some("pn-2".into());
        let phones = vec![PhoneNumber::new("pn-1", "+15550100").assigned_to("wf-1"), PhoneNumber::new("pn-2", "+15550101")];
        let flow = WorkflowSerializer::default().deserialize(&original, &agents(), phones);
        assert_eq!(flow.graph.entry().selected_phone_number_id.as_deref(), Some("pn-1"));
    }

    #[test]
    fn test_phone_selection_falls_back_to_record() {
        let mut original = record(vec![]);
        original.phone_number_id = Some("pn-2".into());
        let phones = vec![PhoneNumber::new("pn-1", "+15550100"), PhoneNumber::new("pn-2", "+15550101")];
        let flow = WorkflowSerializer::default().deserialize(&original, &agents(), phones);
        assert_eq!(flow.graph.entry().selected_phone_number_id.as_deref(), Some("pn-2"));

        let saved = WorkflowSerializer::serialize(&flow);
        assert_eq!(saved.phone_number.as_deref(), Some("+15550101"));
        assert_eq!(saved.phone_number_id.as_deref(), Some("pn-2"));
    }

    #[test]
    fn test_serialize_moves_entry_target_first() {
        let mut graph = CallGraph::default();
        graph.add_agent_node(AgentNode::new("A", "Alice"));
        graph.add_agent_node(AgentNode::new("B", "Bob"));
        graph.add_agent_node(AgentNode::new("C", "Carol"));
        graph.connect(ENTRY_NODE_ID, "C");
        graph.connect("A", "B");
        let flow = CallFlow::new("wf-1", "Front desk", graph);

        let saved = WorkflowSerializer::serialize(&flow);
        let order: Vec<&str> = saved.members.iter().map(|m| m.assistant_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);

        let reloaded = WorkflowSerializer::default().deserialize(&saved, &agents(), vec![]);
        assert_eq!(reloaded.graph.entry_target(), Some("C"));
    }

    #[test]
    fn test_serialize_keeps_order_when_entry_target_is_root() {
        let mut graph = CallGraph::default();
        graph.add_agent_node(AgentNode::new("A", "Alice"));
        graph.add_agent_node(AgentNode::new("B", "Bob"));
        graph.connect(ENTRY_NODE_ID, "B");
        graph.connect("B", "A");
        let flow = CallFlow::new("wf-1", "Front desk", graph);

        let saved = WorkflowSerializer::serialize(&flow);
        let order: Vec<&str> = saved.members.iter().map(|m| m.assistant_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);

        let reloaded = WorkflowSerializer::default().deserialize(&saved, &agents(), vec![]);
        assert_eq!(reloaded.graph.entry_target(), Some("B"));
    }

    #[test]
    fn test_serialize_empty_flow() {
        let flow = CallFlow::new("wf-new", "Untitled", CallGraph::default());
        let saved = WorkflowSerializer::serialize(&flow);
        assert_eq!(saved.id, "wf-new");
        assert_eq!(saved.name, "Untitled");
        assert!(saved.members.is_empty());
        assert_eq!(saved.phone_number, None);
    }
}
