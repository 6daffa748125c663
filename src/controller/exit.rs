//! Leaving the editor with unsaved changes.

use tracing::{trace, warn};

use super::{Controller, SaveStatus};
use crate::SquadflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExitState {
    #[default]
    Editing,
    /// The host is showing the unsaved-changes prompt.
    Confirming,
    Exited,
}

/// Answer to an exit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExitRequest {
    /// Nothing unsaved, navigate away now.
    Exit,
    /// Ask the user to save, discard or stay.
    Confirm,
}

/// Choices offered by the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ExitChoice {
    SaveAndExit,
    DiscardAndExit,
    Stay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExitOutcome {
    /// Navigate away. `save_error` is set when a save was attempted and failed.
    Leave { save_error: Option<SquadflowError> },
    Stay,
}

impl Controller {
    pub fn exit_state(&self) -> ExitState {
        self.read().exit
    }

    /// Starts leaving the editor; a dirty flow asks for confirmation first.
    pub fn request_exit(&self) -> ExitRequest {
        let mut state = self.write();
        if state.tracker.is_dirty() {
            trace!("controller::request_exit() confirm");
            state.exit = ExitState::Confirming;
            ExitRequest::Confirm
        } else {
            trace!("controller::request_exit() exit");
            state.exit = ExitState::Exited;
            ExitRequest::Exit
        }
    }

    /// Resolves the unsaved-changes prompt.
    ///
    /// Save-and-exit navigates away only after the save resolves, even when it
    /// fails; the failure is reported through the outcome and the notification
    /// queue. When a save is already running, that save is awaited instead.
    pub async fn resolve_exit(
        &self,
        choice: ExitChoice,
    ) -> ExitOutcome {
        trace!("controller::resolve_exit({})", choice.as_ref());
        match choice {
            ExitChoice::Stay => {
                self.write().exit = ExitState::Editing;
                ExitOutcome::Stay
            }
            ExitChoice::DiscardAndExit => {
                self.write().exit = ExitState::Exited;
                ExitOutcome::Leave { save_error: None }
            }
            ExitChoice::SaveAndExit => {
                let save_error = match self.save().await {
                    Ok(SaveStatus::InFlight) => self.wait_for_save().await,
                    Ok(_) => None,
                    Err(e) => Some(e),
                };
                if let Some(e) = save_error.as_ref() {
                    warn!("controller::resolve_exit leaving with unsaved changes: {}", e);
                }
                self.write().exit = ExitState::Exited;
                ExitOutcome::Leave { save_error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc};

    use async_trait::async_trait;

    use super::*;
    use crate::{
        Result,
        controller::tests::{gated_store, open_with, seeded_store},
        model::{Agent, PhoneNumber, SaveReceipt, WorkflowRecord},
        store::{MemStore, WorkflowStore},
    };

    /// Store that rejects every save.
    struct RejectingStore(MemStore);

    #[async_trait]
    impl WorkflowStore for RejectingStore {
        async fn load_workflow(
            &self,
            workflow_id: &str,
        ) -> Result<WorkflowRecord> {
            self.0.load_workflow(workflow_id).await
        }

        async fn list_client_agents(
            &self,
            client_id: &str,
        ) -> Result<Vec<Agent>> {
            self.0.list_client_agents(client_id).await
        }

        async fn list_unassigned_phone_numbers(
            &self,
            client_id: &str,
        ) -> Result<Vec<PhoneNumber>> {
            self.0.list_unassigned_phone_numbers(client_id).await
        }

        async fn save_workflow(
            &self,
            _workflow_id: &str,
            _record: &WorkflowRecord,
        ) -> Result<SaveReceipt> {
            Err(SquadflowError::Store("service unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_clean_flow_exits_immediately() {
        let controller = open_with(Arc::new(seeded_store())).await;
        assert_eq!(controller.request_exit(), ExitRequest::Exit);
        assert_eq!(controller.exit_state(), ExitState::Exited);
    }

    #[tokio::test]
    async fn test_dirty_flow_asks_and_stay_keeps_edits() {
        let controller = open_with(Arc::new(seeded_store())).await;
        controller.rename("Reception");

        assert_eq!(controller.request_exit(), ExitRequest::Confirm);
        assert_eq!(controller.exit_state(), ExitState::Confirming);

        assert_eq!(controller.resolve_exit(ExitChoice::Stay).await, ExitOutcome::Stay);
        assert_eq!(controller.exit_state(), ExitState::Editing);
        assert!(controller.is_dirty());
        assert_eq!(controller.flow().name, "Reception");
    }

    #[tokio::test]
    async fn test_discard_leaves_store_untouched() {
        let store = seeded_store();
        let controller = open_with(Arc::new(store.clone())).await;
        controller.rename("Reception");
        controller.request_exit();

        let outcome = controller.resolve_exit(ExitChoice::DiscardAndExit).await;
        assert_eq!(outcome, ExitOutcome::Leave { save_error: None });
        assert_eq!(controller.exit_state(), ExitState::Exited);
        assert_eq!(store.workflow("wf-1").unwrap().name, "Front desk");
    }

    #[tokio::test]
    async fn test_save_and_exit_persists() {
        let store = seeded_store();
        let controller = open_with(Arc::new(store.clone())).await;
        controller.rename("Reception");
        controller.request_exit();

        let outcome = controller.resolve_exit(ExitChoice::SaveAndExit).await;
        assert_eq!(outcome, ExitOutcome::Leave { save_error: None });
        assert_eq!(store.workflow("wf-1").unwrap().name, "Reception");
        assert!(!controller.is_dirty());
    }

    #[tokio::test]
    async fn test_save_and_exit_leaves_even_when_save_fails() {
        let controller = open_with(Arc::new(RejectingStore(seeded_store()))).await;
        controller.rename("Reception");
        controller.request_exit();

        let outcome = controller.resolve_exit(ExitChoice::SaveAndExit).await;
        assert_eq!(
            outcome,
            ExitOutcome::Leave {
                save_error: Some(SquadflowError::Store("service unavailable".into()))
            }
        );
        assert_eq!(controller.exit_state(), ExitState::Exited);
        assert!(controller.is_dirty());
        assert!(controller.notifications().drain().iter().any(|n| n.is_error()));
    }

    #[tokio::test]
    async fn test_save_and_exit_waits_for_running_save() {
        let store = gated_store();
        let controller = open_with(store.clone()).await;
        controller.rename("Reception");

        let (saved, outcome, _) = tokio::join!(controller.save(), controller.resolve_exit(ExitChoice::SaveAndExit), async {
            assert!(controller.is_saving());
            assert_eq!(controller.exit_state(), ExitState::Editing);
            store.gate.notify_one();
        });

        assert_eq!(saved.unwrap(), SaveStatus::Saved);
        assert_eq!(outcome, ExitOutcome::Leave { save_error: None });
        assert!(!controller.is_saving());
        assert_eq!(controller.exit_state(), ExitState::Exited);
        assert_eq!(store.inner.workflow("wf-1").unwrap().name, "Reception");
    }

    #[tokio::test]
    async fn test_save_and_exit_reports_running_save_failure() {
        let store = gated_store();
        store.reject.store(true, std::sync::atomic::Ordering::SeqCst);
        let controller = open_with(store.clone()).await;
        controller.rename("Reception");

        let (saved, outcome, _) = tokio::join!(controller.save(), controller.resolve_exit(ExitChoice::SaveAndExit), async {
            store.gate.notify_one();
        });

        assert!(saved.is_err());
        assert_eq!(
            outcome,
            ExitOutcome::Leave {
                save_error: Some(SquadflowError::Store("gate closed".into()))
            }
        );
        assert!(controller.is_dirty());
    }

    #[tokio::test]
    async fn test_dropped_save_does_not_block_exit() {
        let store = gated_store();
        let controller = open_with(store.clone()).await;
        controller.rename("Reception");

        tokio::select! {
            biased;
            _ = controller.save() => panic!("save should wait on the gate"),
            _ = std::future::ready(()) => {}
        }
        assert!(!controller.is_saving());
        assert!(matches!(controller.wait_for_save().await, Some(SquadflowError::Editor(_))));

        store.gate.notify_one();
        let outcome = controller.resolve_exit(ExitChoice::SaveAndExit).await;
        assert_eq!(outcome, ExitOutcome::Leave { save_error: None });
        assert_eq!(store.inner.workflow("wf-1").unwrap().name, "Reception");
    }

    #[test]
    fn test_exit_choice_from_str() {
        assert_eq!(ExitChoice::from_str("save_and_exit").unwrap(), ExitChoice::SaveAndExit);
        assert_eq!(ExitChoice::Stay.as_ref(), "stay");
        assert!(ExitChoice::from_str("maybe").is_err());
    }
}
