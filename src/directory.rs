//! Best-effort agent lookup used at the workflow record boundary.
//!
//! Workflow records address destination agents by display name. Names are not
//! unique, so a lookup by name returns the first agent in client order and logs
//! a warning when the name is shared.

use tracing::warn;

use crate::model::Agent;

/// Read-only view over the agents available to a client.
#[derive(Debug, Clone, Copy)]
pub struct AgentDirectory<'a> {
    agents: &'a [Agent],
}

impl<'a> AgentDirectory<'a> {
    pub fn new(agents: &'a [Agent]) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &'a [Agent] {
        self.agents
    }

    /// Resolves a display name to an agent. First match in client order wins.
    pub fn by_name(
        &self,
        name: &str,
    ) -> Option<&'a Agent> {
        let mut matches = self.agents.iter().filter(|a| a.name == name);
        let first = matches.next()?;
        if matches.next().is_some() {
            warn!("directory::by_name({}) is ambiguous, using agent {}", name, first.platform_id);
        }
        Some(first)
    }

    pub fn by_platform_id(
        &self,
        platform_id: &str,
    ) -> Option<&'a Agent> {
        self.agents.iter().find(|a| a.platform_id == platform_id)
    }

    /// Whether more than one agent shares `name`.
    pub fn is_ambiguous(
        &self,
        name: &str,
    ) -> bool {
        self.agents.iter().filter(|a| a.name == name).count() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_first_match_wins() {
        let agents = vec![Agent::new("1", "A", "Alice"), Agent::new("2", "B", "Bob"), Agent::new("3", "C", "Alice")];
        let directory = AgentDirectory::new(&agents);
        assert_eq!(directory.by_name("Alice").unwrap().platform_id, "A");
        assert!(directory.is_ambiguous("Alice"));
        assert!(!directory.is_ambiguous("Bob"));
        assert!(directory.by_name("Dave").is_none());
    }

    #[test]
    fn test_by_platform_id() {
        let agents = vec![Agent::new("1", "A", "Alice")];
        let directory = AgentDirectory::new(&agents);
        assert_eq!(directory.by_platform_id("A").unwrap().name, "Alice");
        assert!(directory.by_platform_id("1").is_none());
    }
}
