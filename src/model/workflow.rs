use serde::{Deserialize, Serialize};

use crate::{Result, SquadflowError};

/// Persisted, platform-facing form of a call flow.
///
/// Destinations address their target agent by display name, not by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Platform id of the member agent.
    pub assistant_id: String,
    #[serde(default)]
    pub assistant_destinations: Vec<Destination>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DestinationType {
    #[default]
    Assistant,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "type", default)]
    pub kind: DestinationType,
    /// Display name of the target agent.
    pub assistant_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub message: String,
}

impl Destination {
    pub fn assistant(
        name: impl Into<String>,
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: DestinationType::Assistant,
            assistant_name: name.into(),
            description: description.into(),
            message: message.into(),
        }
    }
}

/// Result of a `save_workflow` call as reported by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveReceipt {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl WorkflowRecord {
    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<WorkflowRecord>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(SquadflowError::Workflow(format!("{}", e))),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
