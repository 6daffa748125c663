mod agent;
mod workflow;

pub use agent::{Agent, PhoneNumber};
pub use workflow::{Destination, DestinationType, Member, SaveReceipt, WorkflowRecord};
