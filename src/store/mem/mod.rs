mod collect;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::{
    Result, SquadflowError,
    model::{Agent, PhoneNumber, SaveReceipt, WorkflowRecord},
    store::WorkflowStore,
};
use collect::Collect;

/// In-memory [`WorkflowStore`].
///
/// Saving a record moves the phone-number assignment to that workflow, the way
/// the platform binds a number to a squad.
#[derive(Clone)]
pub struct MemStore {
    workflows: Arc<Collect<WorkflowRecord>>,
    agents: Arc<Collect<Vec<Agent>>>,
    phone_numbers: Arc<Collect<Vec<PhoneNumber>>>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(Collect::new("workflows")),
            agents: Arc::new(Collect::new("agents")),
            phone_numbers: Arc::new(Collect::new("phone_numbers")),
        }
    }

    pub fn insert_workflow(
        &self,
        record: WorkflowRecord,
    ) {
        let id = record.id.clone();
        self.workflows.upsert(&id, record);
    }

    pub fn insert_agents(
        &self,
        client_id: &str,
        agents: Vec<Agent>,
    ) {
        self.agents.upsert(client_id, agents);
    }

    pub fn insert_phone_numbers(
        &self,
        client_id: &str,
        phone_numbers: Vec<PhoneNumber>,
    ) {
        self.phone_numbers.upsert(client_id, phone_numbers);
    }

    pub fn workflow(
        &self,
        workflow_id: &str,
    ) -> Option<WorkflowRecord> {
        self.workflows.find(workflow_id)
    }

    /// Every phone number of a client, assigned or not.
    pub fn phone_numbers(
        &self,
        client_id: &str,
    ) -> Vec<PhoneNumber> {
        self.phone_numbers.find(client_id).unwrap_or_default()
    }

    fn assign_phone_number(
        &self,
        workflow_id: &str,
        phone_number_id: Option<&str>,
    ) {
        self.phone_numbers.update_all(|_, numbers| {
            for number in numbers.iter_mut() {
                let selected = phone_number_id == Some(number.id.as_str());
                let owned = number.workflow_id.as_deref() == Some(workflow_id);
                if selected && !owned {
                    number.workflow_id = Some(workflow_id.to_string());
                } else if !selected && owned {
                    number.workflow_id = None;
                }
            }
        });
    }
}

#[async_trait]
impl WorkflowStore for MemStore {
    async fn load_workflow(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowRecord> {
        trace!("store::load_workflow({})", workflow_id);
        self.workflow(workflow_id).ok_or_else(|| SquadflowError::NotFound(format!("workflow {}", workflow_id)))
    }

    async fn list_client_agents(
        &self,
        client_id: &str,
    ) -> Result<Vec<Agent>> {
        trace!("store::list_client_agents({})", client_id);
        Ok(self.agents.find(client_id).unwrap_or_default())
    }

    async fn list_unassigned_phone_numbers(
        &self,
        client_id: &str,
    ) -> Result<Vec<PhoneNumber>> {
        trace!("store::list_unassigned_phone_numbers({})", client_id);
        Ok(self.phone_numbers(client_id).into_iter().filter(|p| p.workflow_id.is_none()).collect())
    }

    async fn save_workflow(
        &self,
        workflow_id: &str,
        record: &WorkflowRecord,
    ) -> Result<SaveReceipt> {
        trace!("store::save_workflow({})", workflow_id);
        if workflow_id.is_empty() {
            return Ok(SaveReceipt::failed("missing id in workflow"));
        }
        let mut record = record.clone();
        record.id = workflow_id.to_string();
        self.assign_phone_number(workflow_id, record.phone_number_id.as_deref());
        self.workflows.upsert(workflow_id, record);
        Ok(SaveReceipt::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemStore {
        let store = MemStore::new();
        store.insert_agents("client-1", vec![Agent::new("1", "A", "Alice")]);
        store.insert_phone_numbers(
            "client-1",
            vec![PhoneNumber::new("pn-1", "+15550100").assigned_to("wf-1"), PhoneNumber::new("pn-2", "+15550101")],
        );
        store.insert_workflow(WorkflowRecord {
            id: "wf-1".into(),
            name: "Front desk".into(),
            phone_number: Some("+15550100".into()),
            phone_number_id: Some("pn-1".into()),
            members: vec![],
        });
        store
    }

    #[tokio::test]
    async fn test_load_unknown_workflow() {
        let err = store().load_workflow("missing").await.unwrap_err();
        assert_eq!(err, SquadflowError::NotFound("workflow missing".into()));
    }

    #[tokio::test]
    async fn test_list_agents_and_unassigned_numbers() {
        let store = store();
        assert_eq!(store.list_client_agents("client-1").await.unwrap().len(), 1);
        assert!(store.list_client_agents("client-2").await.unwrap().is_empty());

        let unassigned = store.list_unassigned_phone_numbers("client-1").await.unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, "pn-2");
    }

    #[tokio::test]
    async fn test_save_moves_phone_assignment() {
        let store = store();
        let mut record = store.load_workflow("wf-1").await.unwrap();
        record.name = "Reception".into();
        record.phone_number = Some("+15550101".into());
        record.phone_number_id = Some("pn-2".into());

        let receipt = store.save_workflow("wf-1", &record).await.unwrap();
        assert!(receipt.success);
        assert_eq!(store.workflow("wf-1").unwrap().name, "Reception");

        let numbers = store.phone_numbers("client-1");
        assert_eq!(numbers[0].workflow_id, None);
        assert_eq!(numbers[1].workflow_id.as_deref(), Some("wf-1"));
    }

    #[tokio::test]
    async fn test_keeps_every_saved_workflow() {
        let store = MemStore::new();
        for i in 0..5000 {
            let record = WorkflowRecord {
                name: format!("Flow {}", i),
                ..Default::default()
            };
            store.save_workflow(&format!("wf-{}", i), &record).await.unwrap();
        }

        let missing = (0..5000).filter(|i| store.workflow(&format!("wf-{}", i)).is_none()).count();
        assert_eq!(missing, 0);
        assert_eq!(store.load_workflow("wf-4999").await.unwrap().name, "Flow 4999");
    }

    #[tokio::test]
    async fn test_save_without_id_fails() {
        let receipt = store().save_workflow("", &WorkflowRecord::default()).await.unwrap();
        assert!(!receipt.success);
        assert!(receipt.error.is_some());
    }
}
