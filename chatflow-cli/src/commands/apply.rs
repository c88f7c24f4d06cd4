//! `chatflow apply <SCRIPT.yaml>`: several operations against one in-memory session.
//!
//! ```yaml
//! - { op: assign, contact: c3, agent: a5 }
//! - { op: set_status, contact: c3, status: advising }
//! - { op: unassign, contact: c3 }        # blocked: c3 is advising
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use chatflow_core::{AgentId, Contact, ContactId, ContactStatus, MutationOutcome, NotFound};

use super::Session;

/// Arguments for `chatflow apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// YAML file holding a list of operations.
    pub script: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Assign { contact: ContactId, agent: AgentId },
    Unassign { contact: ContactId },
    SetStatus { contact: ContactId, status: ContactStatus },
}

impl Step {
    fn contact(&self) -> &ContactId {
        match self {
            Step::Assign { contact, .. }
            | Step::Unassign { contact }
            | Step::SetStatus { contact, .. } => contact,
        }
    }

    fn describe(&self) -> String {
        match self {
            Step::Assign { contact, agent } => format!("assign {agent} to {contact}"),
            Step::Unassign { contact } => format!("unassign {contact}"),
            Step::SetStatus { contact, status } => format!("set {contact} to {status}"),
        }
    }
}

#[derive(Serialize)]
struct StepJson {
    step: usize,
    operation: String,
    /// `applied`, `blocked` or `not_found`.
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Serialize)]
struct ApplyJson<'a> {
    steps: Vec<StepJson>,
    consistent: bool,
    revision: u64,
    contacts: Vec<&'a Contact>,
}

impl ApplyArgs {
    pub fn run(self, session: &mut Session) -> Result<()> {
        let contents = std::fs::read_to_string(&self.script)
            .with_context(|| format!("cannot read script '{}'", self.script.display()))?;
        let steps: Vec<Step> = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse script '{}'", self.script.display()))?;

        let mut results = Vec::with_capacity(steps.len());
        let mut missing = 0usize;
        for (n, step) in steps.iter().enumerate() {
            let result = execute(session, step);
            if result.is_err() {
                missing += 1;
            }
            if !self.json {
                print_step(n + 1, step, &result);
            }
            results.push(to_json(n + 1, step, result));
        }

        let registry = &session.crm.registry;
        let consistent = registry.is_consistent();

        if self.json {
            let touched: BTreeSet<&ContactId> = steps.iter().map(Step::contact).collect();
            let payload = ApplyJson {
                steps: results,
                consistent,
                revision: registry.revision(),
                contacts: touched.into_iter().filter_map(|id| registry.get(id)).collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize apply JSON")?
            );
        } else {
            let applied = results.iter().filter(|r| r.outcome == "applied").count();
            println!(
                "{} steps | {} applied | {} blocked | {} not found",
                results.len(),
                applied,
                results.len() - applied - missing,
                missing,
            );
        }

        if !consistent {
            bail!("registry invariant violated after script");
        }
        if missing > 0 {
            bail!("{missing} step(s) referenced unknown contacts or agents");
        }
        Ok(())
    }
}

fn execute(session: &mut Session, step: &Step) -> Result<MutationOutcome, NotFound> {
    let registry = &mut session.crm.registry;
    match step {
        Step::Assign { contact, agent } => registry.assign_agent(contact, agent),
        Step::Unassign { contact } => registry.remove_agent(contact),
        Step::SetStatus { contact, status } => registry.change_status(contact, *status),
    }
}

fn print_step(n: usize, step: &Step, result: &Result<MutationOutcome, NotFound>) {
    let what = step.describe();
    match result {
        Ok(MutationOutcome::Applied) => println!("{n:>3}. {} {what}", "✓".green()),
        Ok(MutationOutcome::Blocked(reason)) => println!(
            "{n:>3}. {} {what}: blocked: {reason} ({})",
            "✗".yellow().bold(),
            reason.hint()
        ),
        Err(err) => println!("{n:>3}. {} {what}: {err}", "✗".red().bold()),
    }
}

fn to_json(n: usize, step: &Step, result: Result<MutationOutcome, NotFound>) -> StepJson {
    let (outcome, reason, detail) = match result {
        Ok(MutationOutcome::Applied) => ("applied", None, None),
        Ok(MutationOutcome::Blocked(reason)) => {
            ("blocked", Some(reason.key()), Some(reason.hint().to_string()))
        }
        Err(err) => ("not_found", None, Some(err.to_string())),
    };
    StepJson { step: n, operation: step.describe(), outcome, reason, detail }
}
