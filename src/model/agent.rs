use serde::{Deserialize, Serialize};

/// A voice agent configured for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Stable id of the agent record.
    pub id: String,
    /// Id assigned by the voice-agent platform.
    pub platform_id: String,
    /// Display name, also used to address the agent inside a workflow record.
    pub name: String,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        platform_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            platform_id: platform_id.into(),
            name: name.into(),
        }
    }
}

/// A phone number that can be bound to a workflow's entry node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub id: String,
    pub number: String,
    /// Workflow this number is currently assigned to, if any.
    #[serde(default)]
    pub workflow_id: Option<String>,
}

impl PhoneNumber {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            workflow_id: None,
        }
    }

    pub fn assigned_to(
        mut self,
        workflow_id: impl Into<String>,
    ) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }
}
