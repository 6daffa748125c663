use serde::Serialize;

use crate::graph::CallGraph;

/// A call flow as held by the editor: workflow identity plus its graph.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct CallFlow {
    pub id: String,
    pub name: String,
    pub graph: CallGraph,
}

impl CallFlow {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        graph: CallGraph,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            graph,
        }
    }
}
