use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    Config, Controller, Result, SquadflowError,
    graph::{CallFlow, CallGraph, EntryNode},
    layout::LayoutEngine,
    model::PhoneNumber,
    serializer::WorkflowSerializer,
    store::WorkflowStore,
    utils,
};

pub struct EditorBuilder {
    store: Arc<dyn WorkflowStore>,
    config: Config,
    client_id: Option<String>,
}

impl EditorBuilder {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self {
            store,
            config: Config::default(),
            client_id: None,
        }
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Client whose agents and phone numbers the editor offers.
    pub fn client_id(
        mut self,
        client_id: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    fn require_client_id(&self) -> Result<String> {
        match self.client_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(SquadflowError::Editor("client id is required".to_string())),
        }
    }

    fn serializer(&self) -> WorkflowSerializer {
        WorkflowSerializer::new(LayoutEngine::new(self.config.layout.clone()))
    }

    /// Loads an existing workflow and opens it for editing.
    pub async fn open(
        &self,
        workflow_id: &str,
    ) -> Result<Controller> {
        let client_id = self.require_client_id()?;
        debug!("builder::open({}, client={})", workflow_id, client_id);

        let record = self.store.load_workflow(workflow_id).await?;
        let agents = self.store.list_client_agents(&client_id).await?;
        let mut phone_numbers = self.store.list_unassigned_phone_numbers(&client_id).await?;

        // the number already bound to this workflow is not "unassigned", keep it selectable
        if let Some(id) = record.phone_number_id.as_deref() {
            if !phone_numbers.iter().any(|p| p.id == id) {
                let number = PhoneNumber::new(id, record.phone_number.clone().unwrap_or_default()).assigned_to(record.id.clone());
                phone_numbers.insert(0, number);
            }
        }

        let serializer = self.serializer();
        let flow = serializer.deserialize(&record, &agents, phone_numbers);
        info!("opened workflow {} with {} agents", flow.id, flow.graph.agents().count());

        Ok(Controller::new(client_id, self.store.clone(), serializer, agents, flow, self.config.editor.notification_capacity))
    }

    /// Starts a new, empty workflow. Nothing is persisted until the first save.
    pub async fn create(
        &self,
        name: &str,
    ) -> Result<Controller> {
        let client_id = self.require_client_id()?;
        let agents = self.store.list_client_agents(&client_id).await?;
        let phone_numbers = self.store.list_unassigned_phone_numbers(&client_id).await?;

        let serializer = self.serializer();
        let mut entry = EntryNode::new(phone_numbers, None);
        entry.position = serializer.layout().entry_position();
        let flow = CallFlow::new(utils::longid(), name, CallGraph::new(entry));
        info!("created workflow {}", flow.id);

        Ok(Controller::new(client_id, self.store.clone(), serializer, agents, flow, self.config.editor.notification_capacity))
    }
}
