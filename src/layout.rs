//! Automatic layout of call graphs.
//!
//! Workflow records store no coordinates, so every load recomputes positions.
//! Agents are leveled by breadth-first traversal from a single root and each
//! level is laid out as a centered row; anything the traversal does not reach
//! is stacked below the placed rows.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, warn};

use crate::{
    config::LayoutConfig,
    directory::AgentDirectory,
    graph::{AgentNode, CallGraph, ENTRY_NODE_ID, Edge, EdgePayload, NodeId, Position},
    model::{Agent, Member},
};

/// A transfer derived from a workflow record destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub source: NodeId,
    pub target: NodeId,
    pub payload: EdgePayload,
}

/// Result of leveling a set of agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leveling {
    /// Root the traversal started from.
    pub root: Option<NodeId>,
    /// Agent ids per level, in discovery order.
    pub levels: Vec<Vec<NodeId>>,
    /// Agents never reached by the traversal, in input order.
    pub unreached: Vec<NodeId>,
    /// Position of every agent.
    pub positions: HashMap<NodeId, Position>,
}

impl Leveling {
    pub fn level_of(
        &self,
        id: &str,
    ) -> Option<usize> {
        self.levels.iter().position(|row| row.iter().any(|n| n == id))
    }

    pub fn position_of(
        &self,
        id: &str,
    ) -> Option<Position> {
        self.positions.get(id).copied()
    }
}

/// Positioned agents and derived edges for a workflow record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    /// Member agents in record order, followed by non-member destination targets.
    pub agents: Vec<AgentNode>,
    /// Target of the entry node's edge.
    pub entry_target: Option<NodeId>,
    pub entry_position: Position,
    /// Transfers whose target resolved, in record order.
    pub transfers: Vec<Transfer>,
    pub leveling: Leveling,
}

/// Computes node positions for call graphs.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Fixed top-center position of the entry node.
    pub fn entry_position(&self) -> Position {
        Position::new(self.config.center_x - self.config.node_width / 2.0, self.config.entry_y)
    }

    /// Plans the layout of a workflow record's members.
    ///
    /// Destination names are resolved against every agent available to the
    /// client. Destinations naming an unknown agent are dropped.
    pub fn plan(
        &self,
        members: &[Member],
        agents: &[Agent],
    ) -> LayoutPlan {
        let directory = AgentDirectory::new(agents);

        let mut ids: Vec<NodeId> = Vec::new();
        let mut labels: HashMap<NodeId, String> = HashMap::new();

        for member in members.iter() {
            let label = directory.by_platform_id(&member.assistant_id).map(|a| a.name.as_str()).unwrap_or(member.assistant_id.as_str());
            if labels.insert(member.assistant_id.clone(), label.to_string()).is_none() {
                ids.push(member.assistant_id.clone());
            }
        }
        let member_count = ids.len();

        let mut transfers = Vec::new();
        for member in members.iter() {
            for destination in member.assistant_destinations.iter() {
                let Some(target) = directory.by_name(&destination.assistant_name) else {
                    warn!(
                        "layout::plan dropped destination {} -> '{}': no agent with that name",
                        member.assistant_id, destination.assistant_name
                    );
                    continue;
                };
                if !labels.contains_key(&target.platform_id) {
                    labels.insert(target.platform_id.clone(), target.name.clone());
                    ids.push(target.platform_id.clone());
                }
                transfers.push(Transfer {
                    source: member.assistant_id.clone(),
                    target: target.platform_id.clone(),
                    payload: EdgePayload::new(destination.description.clone(), destination.message.clone()),
                });
            }
        }

        let pairs: Vec<(NodeId, NodeId)> = transfers.iter().map(|t| (t.source.clone(), t.target.clone())).collect();
        let leveling = self.level(&ids, &pairs, None, |idx| idx < member_count);

        let agents = ids
            .iter()
            .map(|id| {
                let label = labels.get(id).cloned().unwrap_or_default();
                AgentNode::new(id.clone(), label).at(leveling.position_of(id).unwrap_or_default())
            })
            .collect();

        LayoutPlan {
            agents,
            entry_target: leveling.root.clone(),
            entry_position: self.entry_position(),
            transfers,
            leveling,
        }
    }

    /// Recomputes every position of an existing graph.
    ///
    /// The entry node's target, when connected, is used as the root.
    pub fn arrange(
        &self,
        graph: &mut CallGraph,
    ) -> Leveling {
        let ids = graph.agent_ids();
        let pairs: Vec<(NodeId, NodeId)> = graph
            .edges()
            .iter()
            .filter_map(|e| match e {
                Edge::Conditional(edge) => Some((edge.source.clone(), edge.target.clone())),
                Edge::Unconditional(_) => None,
            })
            .collect();
        let root_hint = graph.entry_target().map(str::to_string);

        let leveling = self.level(&ids, &pairs, root_hint.as_deref(), |_| true);

        graph.set_position(ENTRY_NODE_ID, self.entry_position());
        for id in ids.iter() {
            if let Some(position) = leveling.position_of(id) {
                graph.set_position(id, position);
            }
        }
        leveling
    }

    /// Position for an agent newly added to `graph`: stacked below the lowest agent.
    pub fn next_free_position(
        &self,
        graph: &CallGraph,
    ) -> Position {
        let lowest = graph.agents().map(|a| a.position.y).fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |m| m.max(y))));
        let y = match lowest {
            Some(y) => y + self.config.vertical_spacing,
            None => self.config.base_y,
        };
        Position::new(self.config.center_x - self.config.node_width / 2.0, y)
    }

    /// Levels `ids` by breadth-first traversal over `pairs`.
    ///
    /// Without a usable `root_hint`, the root is the first id accepted by
    /// `root_candidate` that never appears as a target. When no root exists the
    /// traversal is skipped and every agent is stacked.
    fn level(
        &self,
        ids: &[NodeId],
        pairs: &[(NodeId, NodeId)],
        root_hint: Option<&str>,
        root_candidate: impl Fn(usize) -> bool,
    ) -> Leveling {
        let mut graph: DiGraph<NodeId, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for id in ids.iter() {
            index.insert(id.as_str(), graph.add_node(id.clone()));
        }
        for (source, target) in pairs.iter() {
            if let (Some(s), Some(t)) = (index.get(source.as_str()), index.get(target.as_str())) {
                graph.add_edge(*s, *t, ());
            }
        }

        let root = match root_hint.and_then(|id| index.get(id)) {
            Some(idx) => Some(*idx),
            None => graph
                .node_indices()
                .filter(|idx| root_candidate(idx.index()))
                .find(|idx| graph.neighbors_directed(*idx, Direction::Incoming).next().is_none()),
        };

        let mut levels: Vec<Vec<NodeId>> = Vec::new();
        if let Some(root) = root {
            let mut visited: HashSet<NodeIndex> = HashSet::new();
            let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
            visited.insert(root);
            queue.push_back((root, 0));

            while let Some((idx, level)) = queue.pop_front() {
                if levels.len() <= level {
                    levels.push(Vec::new());
                }
                levels[level].push(graph[idx].clone());

                // petgraph walks outgoing edges newest first; restore insertion order
                let mut outgoing: Vec<_> = graph.edges_directed(idx, Direction::Outgoing).collect();
                outgoing.sort_by_key(|e| e.id().index());
                for edge in outgoing {
                    let next = edge.target();
                    if visited.insert(next) {
                        queue.push_back((next, level + 1));
                    }
                }
            }
        }

        let mut positions = HashMap::new();
        let step = self.config.node_width + self.config.horizontal_spacing;
        for (level, row) in levels.iter().enumerate() {
            let count = row.len() as f64;
            let total_width = count * self.config.node_width + (count - 1.0) * self.config.horizontal_spacing;
            let start_x = self.config.center_x - total_width / 2.0;
            let y = self.config.base_y + level as f64 * self.config.vertical_spacing;
            for (i, id) in row.iter().enumerate() {
                positions.insert(id.clone(), Position::new(start_x + i as f64 * step, y));
            }
        }

        let mut unreached = Vec::new();
        let mut row = levels.len();
        for id in ids.iter() {
            if positions.contains_key(id) {
                continue;
            }
            let y = self.config.base_y + row as f64 * self.config.vertical_spacing;
            positions.insert(id.clone(), Position::new(self.config.center_x - self.config.node_width / 2.0, y));
            unreached.push(id.clone());
            row += 1;
        }

        let root = root.map(|idx| graph[idx].clone());
        debug!("layout::level root={:?} levels={} unreached={}", root, levels.len(), unreached.len());

        Leveling {
            root,
            levels,
            unreached,
            positions,
        }
    }
}
