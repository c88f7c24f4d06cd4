//! Error types for chatflow-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AgentId, ContactId};

/// A reference passed to a registry operation did not resolve.
///
/// Fails the single call it was returned from; registry state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("contact '{0}' not found")]
    Contact(ContactId),

    #[error("agent '{0}' not found")]
    Agent(AgentId),
}

/// All errors that can arise while loading data or building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The compiled-in dataset failed to parse.
    #[error("bundled dataset is malformed: {0}")]
    Bundled(#[source] serde_yaml::Error),

    /// `dirs::home_dir()` returned `None`, so we cannot locate `~/.chatflow/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The dataset file did not exist at the expected path.
    #[error("dataset not found at {path}")]
    DataNotFound { path: PathBuf },

    #[error("duplicate contact id '{0}'")]
    DuplicateContact(ContactId),

    #[error("duplicate agent id '{0}'")]
    DuplicateAgent(AgentId),

    /// Initial data references an agent the directory does not know.
    #[error("contact '{contact}' references unknown agent '{agent}'")]
    DanglingAgent { contact: ContactId, agent: AgentId },

    /// Initial data has an advising contact with no agent.
    #[error("contact '{0}' is advising without an assigned agent")]
    AdvisingWithoutAgent(ContactId),

    #[error(transparent)]
    NotFound(#[from] NotFound),
}
