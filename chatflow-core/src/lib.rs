//! ChatFlow core library: contact registry, agent directory, projections.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`RegistryError`], [`NotFound`]
//! - [`directory`]: [`AgentDirectory`] and its static implementation
//! - [`registry`]: [`ContactRegistry`], the only place contacts change
//! - [`query`]: filtering, pagination and ordering for views
//! - [`dataset`]: read-only YAML dataset loading
//! - [`settings`]: `~/.chatflow/` paths and user settings

pub mod dataset;
pub mod directory;
pub mod error;
pub mod query;
pub mod registry;
pub mod settings;
pub mod types;

pub use dataset::{Crm, Dataset};
pub use directory::{AgentDirectory, StaticAgentDirectory};
pub use error::{NotFound, RegistryError};
pub use registry::{BlockReason, ContactRegistry, MutationOutcome};
pub use settings::{DataSource, Settings};
pub use types::{
    Agent, AgentId, AgentLevel, AgentPerformance, AgentPresence, AgentSales, AgentStats,
    Analytics, Contact, ContactId, ContactStatus, DailyConversations, DashboardStats, Message,
    MessageId, MonthlyActivity, ProductSales, Sender,
};
