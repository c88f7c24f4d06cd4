//! Read-only dataset loading.
//!
//! A dataset is one YAML document with `agents`, `contacts`, `messages` and
//! `analytics`. It is only ever read: registry mutations stay in memory for
//! the lifetime of the process.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::{AgentDirectory, StaticAgentDirectory};
use crate::error::RegistryError;
use crate::registry::ContactRegistry;
use crate::settings::DataSource;
use crate::types::{Agent, Analytics, Contact, Message};

const BUNDLED: &str = include_str!("../data/seed.yaml");

/// Raw dataset as stored on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub analytics: Analytics,
}

impl Dataset {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self, RegistryError> {
        serde_yaml::from_str(BUNDLED).map_err(RegistryError::Bundled)
    }

    /// Load a dataset file.
    ///
    /// Returns `RegistryError::DataNotFound` if absent,
    /// `RegistryError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::DataNotFound { path: path.to_path_buf() });
        }
        let contents = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_yaml::from_str(&contents).map_err(|e| {
            RegistryError::Parse { path: path.to_path_buf(), source: e }
        })?;
        tracing::debug!(
            path = %path.display(),
            contacts = dataset.contacts.len(),
            agents = dataset.agents.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn load(source: &DataSource) -> Result<Self, RegistryError> {
        match source {
            DataSource::File(path) => Self::load_at(path),
            DataSource::Bundled => Self::bundled(),
        }
    }

    /// Validate and split into a live [`Crm`].
    pub fn into_crm(self) -> Result<Crm, RegistryError> {
        let directory = StaticAgentDirectory::new(self.agents)?;
        let registry = ContactRegistry::new(self.contacts, directory)?;

        for message in &self.messages {
            if registry.get(&message.contact_id).is_none() {
                tracing::warn!(
                    message = %message.id,
                    contact = %message.contact_id,
                    "message references unknown contact"
                );
            }
        }
        let analytics_agents = self
            .analytics
            .agent_sales
            .iter()
            .map(|s| &s.agent)
            .chain(self.analytics.agent_performance.iter().map(|p| &p.agent));
        for agent in analytics_agents {
            if registry.directory().resolve(agent).is_none() {
                tracing::warn!(agent = %agent, "analytics row references unknown agent");
            }
        }

        Ok(Crm {
            registry,
            messages: self.messages,
            analytics: self.analytics,
        })
    }
}

/// Everything a session works with: the live registry plus read-only data.
#[derive(Debug, Clone)]
pub struct Crm {
    pub registry: ContactRegistry<StaticAgentDirectory>,
    pub messages: Vec<Message>,
    pub analytics: Analytics,
}

impl Crm {
    pub fn bundled() -> Result<Self, RegistryError> {
        Dataset::bundled()?.into_crm()
    }

    pub fn agents(&self) -> &[Agent] {
        self.registry.directory().agents()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
