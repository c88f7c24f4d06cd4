//! ChatFlow: contact, agent and report CLI.
//!
//! # Usage
//!
//! ```text
//! chatflow [--data <PATH>] dashboard [--recent N] [--json]
//! chatflow contacts list [--status S] [--search Q] [--page N] [--json]
//! chatflow contacts show <ID>
//! chatflow contacts assign <ID> <AGENT>
//! chatflow contacts unassign <ID>
//! chatflow contacts set-status <ID> <STATUS>
//! chatflow apply <SCRIPT.yaml> [--json]
//! chatflow agents list [--search Q] [--view team|performance|availability] [--json]
//! chatflow conversations list [--search Q]
//! chatflow conversations show <ID>
//! chatflow report summary [--output PATH] [--stdout]
//! chatflow report conversation <ID> [--output PATH] [--stdout]
//! ```
//!
//! Data is read-only: mutations live for a single invocation. Use `apply` to
//! run several operations against the same in-memory state.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use chatflow_core::ContactStatus;
use commands::{
    agents::AgentsCommand, apply::ApplyArgs, contacts::ContactsCommand,
    conversations::ConversationsCommand, dashboard::DashboardArgs, report::ReportCommand, Session,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "chatflow",
    version,
    about = "Browse and manage ChatFlow CRM contacts, agents and reports",
    long_about = None,
)]
struct Cli {
    /// Dataset file to load instead of the configured or bundled data.
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// KPIs, weekly and monthly activity, and the most recent contacts.
    Dashboard(DashboardArgs),

    /// List, inspect and update contacts.
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },

    /// Run a YAML script of contact operations in one session.
    Apply(ApplyArgs),

    /// Team, performance and availability views of agents.
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// Inbox listing and per-contact transcripts.
    Conversations {
        #[command(subcommand)]
        command: ConversationsCommand,
    },

    /// Render text reports.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared ContactStatus argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ContactStatus` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct StatusArg(pub ContactStatus);

impl FromStr for StatusArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<ContactStatus>().map(Self)
    }
}

impl fmt::Display for StatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<StatusArg> for ContactStatus {
    fn from(s: StatusArg) -> Self {
        s.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut session = Session::open(cli.data)?;
    match cli.command {
        Commands::Dashboard(args) => args.run(&session),
        Commands::Contacts { command } => commands::contacts::run(command, &mut session),
        Commands::Apply(args) => args.run(&mut session),
        Commands::Agents { command } => commands::agents::run(command, &session),
        Commands::Conversations { command } => commands::conversations::run(command, &session),
        Commands::Report { command } => commands::report::run(command, &session),
    }
}
