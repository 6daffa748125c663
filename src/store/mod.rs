//! Persistence seam of the editor.
//!
//! The editor never talks to a database or the voice-agent platform directly.
//! It loads and saves through a [`WorkflowStore`] supplied by the host:
//! - `MemStore`: in-memory implementation for tests and demos
//! - host implementations backed by the platform API

mod mem;

use async_trait::async_trait;

use crate::{
    Result,
    model::{Agent, PhoneNumber, SaveReceipt, WorkflowRecord},
};

pub use mem::MemStore;

/// Collaborator interface consumed by the orchestration editor.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Loads a workflow record by id.
    async fn load_workflow(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowRecord>;

    /// Lists every agent configured for a client.
    async fn list_client_agents(
        &self,
        client_id: &str,
    ) -> Result<Vec<Agent>>;

    /// Lists the client's phone numbers not assigned to any workflow.
    async fn list_unassigned_phone_numbers(
        &self,
        client_id: &str,
    ) -> Result<Vec<PhoneNumber>>;

    /// Persists a workflow record under `workflow_id`.
    async fn save_workflow(
        &self,
        workflow_id: &str,
        record: &WorkflowRecord,
    ) -> Result<SaveReceipt>;
}
