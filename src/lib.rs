//! # Squadflow
//!
//! Squadflow is the editing core of a call-flow builder. It turns a stored squad
//! record (an ordered list of voice agents and the transfers between them) into
//! a positioned, editable call graph, and back.
//!
//! ## Core Features
//!
//! - **Typed Call Graph**: One entry node bound to a phone number, agent nodes, and conditional transfers
//! - **Automatic Layout**: Breadth-first leveling from the entry target, centered rows
//! - **Change Tracking**: Unsaved-changes detection against the last loaded or saved state
//! - **Pluggable Storage**: Load and save through a [`WorkflowStore`], with an in-memory store for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use squadflow::{EditorBuilder, MemStore};
//!
//! let editor = EditorBuilder::new(Arc::new(store)).client_id("client-1").open("wf-1").await?;
//! editor.add_agent("agent-c");
//! editor.connect("agent-b", "agent-c");
//! editor.save().await?;
//! ```

mod builder;
mod common;
pub mod config;
mod controller;
mod directory;
mod editing;
mod error;
mod events;
pub mod graph;
pub mod layout;
mod model;
mod serializer;
mod store;
mod tracker;
mod utils;

use std::sync::{Arc, RwLock};

pub use builder::EditorBuilder;
pub use common::Queue;
pub use config::Config;
pub use controller::{Controller, ExitChoice, ExitOutcome, ExitRequest, ExitState, SaveStatus};
pub use directory::AgentDirectory;
pub use editing::{EdgeEditState, EdgeEditor, EdgeLabel};
pub use error::SquadflowError;
pub use events::{Notification, NotificationLevel};
pub use model::*;
pub use serializer::WorkflowSerializer;
pub use store::{MemStore, WorkflowStore};
pub use tracker::{DirtyTracker, EdgeFingerprint, Snapshot};

/// Result type alias for Squadflow operations.
pub type Result<T> = std::result::Result<T, SquadflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
