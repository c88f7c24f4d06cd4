pub mod agents;
pub mod apply;
pub mod contacts;
pub mod conversations;
pub mod dashboard;
pub mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use chatflow_core::{
    settings::{self, load_settings_at, resolve_data_source},
    Contact, ContactStatus, Crm, Dataset, MutationOutcome, Settings,
};

/// Everything one invocation works against.
pub struct Session {
    pub home: PathBuf,
    pub settings: Settings,
    pub crm: Crm,
}

impl Session {
    pub fn open(data: Option<PathBuf>) -> Result<Self> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let settings = load_settings_at(&home).with_context(|| {
            format!("failed to read {}", settings::settings_path_at(&home).display())
        })?;
        let source = resolve_data_source(data, &settings).context("failed to locate dataset")?;
        let crm = Dataset::load(&source)
            .context("failed to load dataset")?
            .into_crm()
            .context("dataset failed validation")?;
        Ok(Session { home, settings, crm })
    }

    /// Display name of the contact's agent, `-` when unassigned.
    pub fn agent_name(&self, contact: &Contact) -> String {
        self.crm
            .registry
            .assigned_agent(contact)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

pub fn status_badge(status: ContactStatus) -> ColoredString {
    let label = status.label();
    match status {
        ContactStatus::Active => label.green(),
        ContactStatus::Inactive => label.bright_black(),
        ContactStatus::Closed => label.red(),
        ContactStatus::Following => label.blue(),
        ContactStatus::Advising => label.yellow().bold(),
    }
}

/// One line per operation: `✓ <what>` or `✗ blocked: <reason> (<hint>)`.
pub fn print_outcome(what: &str, outcome: MutationOutcome) {
    match outcome {
        MutationOutcome::Applied => println!("{} {what}", "✓".green()),
        MutationOutcome::Blocked(reason) => println!(
            "{} blocked: {reason} ({})",
            "✗".yellow().bold(),
            reason.hint()
        ),
    }
}
