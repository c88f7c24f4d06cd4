//! Read-only agent lookup consumed by the contact registry.

use std::collections::HashMap;

use crate::error::RegistryError;
use crate::types::{Agent, AgentId};

/// Source of truth for which agents exist.
///
/// The registry only ever reads through this trait; it never mutates agents.
pub trait AgentDirectory {
    /// Resolve an agent by id.
    fn resolve(&self, id: &AgentId) -> Option<&Agent>;

    /// All agents, in directory order.
    fn agents(&self) -> &[Agent];
}

/// Directory over a fixed list of agents.
#[derive(Debug, Clone, Default)]
pub struct StaticAgentDirectory {
    agents: Vec<Agent>,
    index: HashMap<AgentId, usize>,
}

impl StaticAgentDirectory {
    /// Build a directory, rejecting duplicate ids.
    pub fn new(agents: Vec<Agent>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(agents.len());
        for (pos, agent) in agents.iter().enumerate() {
            if index.insert(agent.id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateAgent(agent.id.clone()));
            }
        }
        Ok(Self { agents, index })
    }
}

impl AgentDirectory for StaticAgentDirectory {
    fn resolve(&self, id: &AgentId) -> Option<&Agent> {
        self.index.get(id).map(|&pos| &self.agents[pos])
    }

    fn agents(&self) -> &[Agent] {
        &self.agents
    }
}
