//! `chatflow agents list`: team, performance and availability views.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use chatflow_core::{query, Agent, AgentPresence};

use super::Session;

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// List agents.
    List(ListArgs),
}

/// Which agent view to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Roster with role, presence and open chats.
    Team,
    /// Ranked by conversations handled.
    Performance,
    /// Grouped by presence.
    Availability,
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "team" => Ok(View::Team),
            "performance" => Ok(View::Performance),
            "availability" => Ok(View::Availability),
            other => Err(format!(
                "unknown view '{other}'; expected: team, performance, availability"
            )),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Team => write!(f, "team"),
            View::Performance => write!(f, "performance"),
            View::Availability => write!(f, "availability"),
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Match name or role.
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// team | performance | availability.
    #[arg(long, default_value_t = View::Team)]
    pub view: View,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: AgentsCommand, session: &Session) -> Result<()> {
    match cmd {
        AgentsCommand::List(args) => list(args, session),
    }
}

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "presence")]
    presence: String,
    #[tabled(rename = "active chats")]
    active_chats: u32,
}

#[derive(Tabled)]
struct PerformanceRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "level")]
    level: String,
    #[tabled(rename = "conversations")]
    conversations: u32,
    #[tabled(rename = "avg response")]
    avg_response: String,
    #[tabled(rename = "satisfaction")]
    satisfaction: String,
    #[tabled(rename = "resolved")]
    resolved: String,
}

fn list(args: ListArgs, session: &Session) -> Result<()> {
    let agents = query::filter_agents(session.crm.agents(), args.search.as_deref());
    let agents = match args.view {
        View::Performance => query::agent_ranking(agents),
        View::Team | View::Availability => agents,
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&agents).context("failed to serialize agents JSON")?
        );
        return Ok(());
    }

    if agents.is_empty() {
        println!("No agents found.");
        return Ok(());
    }

    match args.view {
        View::Team => print_team(&agents),
        View::Performance => print_performance(&agents),
        View::Availability => print_availability(&agents),
    }
    Ok(())
}

fn print_team(agents: &[&Agent]) {
    let rows: Vec<TeamRow> = agents
        .iter()
        .map(|a| TeamRow {
            id: a.id.to_string(),
            name: a.name.clone(),
            role: a.role.clone(),
            presence: a.presence.to_string(),
            active_chats: a.active_chats,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_performance(agents: &[&Agent]) {
    let rows: Vec<PerformanceRow> = agents
        .iter()
        .enumerate()
        .map(|(i, a)| PerformanceRow {
            rank: i + 1,
            name: a.name.clone(),
            level: a.stats.level.to_string(),
            conversations: a.stats.conversations_handled,
            avg_response: format!("{:.1} min", a.stats.avg_response_minutes),
            satisfaction: format!("{}%", a.stats.satisfaction),
            resolved: format!("{}%", a.stats.resolved_rate),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_availability(agents: &[&Agent]) {
    let counts = query::presence_counts(agents.iter().copied());
    let summary: Vec<String> = counts
        .iter()
        .map(|(presence, n)| format!("{} {presence} {n}", presence_dot(*presence)))
        .collect();
    println!("{}", summary.join("  "));

    for presence in AgentPresence::all() {
        let group: Vec<&&Agent> = agents.iter().filter(|a| a.presence == *presence).collect();
        if group.is_empty() {
            continue;
        }
        println!("{}", presence.to_string().to_uppercase().bold());
        for agent in group {
            println!(
                "  {} {} ({}, {} active chats)",
                agent.id, agent.name, agent.role, agent.active_chats
            );
        }
    }
}

fn presence_dot(presence: AgentPresence) -> String {
    match presence {
        AgentPresence::Online => "●".green().to_string(),
        AgentPresence::Busy => "●".yellow().to_string(),
        AgentPresence::Offline => "●".bright_black().to_string(),
    }
}
