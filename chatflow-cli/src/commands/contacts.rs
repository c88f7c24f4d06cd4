//! `chatflow contacts`: list, show and the three contact mutations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use chatflow_core::{
    query::{paginate, ContactFilter, StatusCounts},
    AgentId, Contact, ContactId, ContactStatus, MutationOutcome,
};

use super::super::StatusArg;
use super::{print_outcome, status_badge, Session};

/// List, inspect and update contacts.
#[derive(Subcommand, Debug)]
pub enum ContactsCommand {
    /// List contacts, one page at a time.
    List(ListArgs),

    /// Show one contact in full.
    Show {
        /// Contact id (e.g. "c1").
        id: String,
    },

    /// Assign or reassign an agent. Status is left unchanged.
    Assign {
        id: String,
        /// Agent id (e.g. "a2").
        agent: String,
    },

    /// Remove the assigned agent. Refused while the contact is advising.
    Unassign { id: String },

    /// Change status: active | advising | following | closed | inactive.
    SetStatus { id: String, status: StatusArg },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only contacts with this status.
    #[arg(long, short = 's')]
    pub status: Option<StatusArg>,

    /// Match name, company, email or phone.
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// 1-based page number.
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: ContactsCommand, session: &mut Session) -> Result<()> {
    match cmd {
        ContactsCommand::List(args) => list(args, session),
        ContactsCommand::Show { id } => show(&ContactId::from(id), session),
        ContactsCommand::Assign { id, agent } => {
            let id = ContactId::from(id);
            let agent = AgentId::from(agent);
            let outcome = session
                .crm
                .registry
                .assign_agent(&id, &agent)
                .with_context(|| format!("cannot assign '{agent}' to '{id}'"))?;
            finish(&id, &format!("assigned {agent} to {id}"), outcome, session)
        }
        ContactsCommand::Unassign { id } => {
            let id = ContactId::from(id);
            let outcome = session
                .crm
                .registry
                .remove_agent(&id)
                .with_context(|| format!("cannot unassign '{id}'"))?;
            finish(&id, &format!("removed agent from {id}"), outcome, session)
        }
        ContactsCommand::SetStatus { id, status } => {
            let id = ContactId::from(id);
            let status: ContactStatus = status.into();
            let outcome = session
                .crm
                .registry
                .change_status(&id, status)
                .with_context(|| format!("cannot change status of '{id}'"))?;
            finish(&id, &format!("{id} is now {status}"), outcome, session)
        }
    }
}

fn finish(id: &ContactId, what: &str, outcome: MutationOutcome, session: &Session) -> Result<()> {
    print_outcome(what, outcome);
    let contact = session
        .crm
        .registry
        .get(id)
        .with_context(|| format!("contact '{id}' vanished"))?;
    print_contact(contact, session);
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ContactListJson<'a> {
    counts: StatusCounts,
    page: usize,
    per_page: usize,
    total_items: usize,
    total_pages: usize,
    contacts: Vec<&'a Contact>,
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "company")]
    company: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "agent")]
    agent: String,
    #[tabled(rename = "last message")]
    last_message_at: String,
    #[tabled(rename = "unread")]
    unread: u32,
}

fn list(args: ListArgs, session: &Session) -> Result<()> {
    let registry = &session.crm.registry;
    let filter = ContactFilter {
        status: args.status.map(ContactStatus::from),
        search: args.search,
    };
    let counts = StatusCounts::of(registry.contacts());
    let page = paginate(filter.apply(registry.contacts()), args.page, session.settings.page_size);

    if args.json {
        let payload = ContactListJson {
            counts,
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
            contacts: page.items,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize contacts JSON")?
        );
        return Ok(());
    }

    let tabs: Vec<String> = ContactStatus::all()
        .iter()
        .map(|s| format!("{} {}", s.label(), counts.get(*s)))
        .collect();
    println!("All {} | {}", counts.total, tabs.join(" | "));

    if page.items.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    let rows: Vec<ContactRow> = page
        .items
        .iter()
        .map(|c| ContactRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            company: c.company.clone(),
            status: c.status.label().to_string(),
            agent: session.agent_name(c),
            last_message_at: c.last_message_at.format("%Y-%m-%d %H:%M").to_string(),
            unread: c.unread_count,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "Page {}/{} ({} matching)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(id: &ContactId, session: &Session) -> Result<()> {
    let contact = session
        .crm
        .registry
        .get(id)
        .with_context(|| format!("contact '{id}' not found"))?;
    print_contact(contact, session);
    Ok(())
}

fn print_contact(contact: &Contact, session: &Session) {
    println!("{} ({})", contact.name.bold(), contact.id);
    println!("  Company: {}", contact.company);
    println!("  Phone:   {}", contact.phone);
    println!("  Email:   {}", contact.email);
    println!("  Country: {}", contact.country);
    println!("  Status:  {}", status_badge(contact.status));
    println!("  Agent:   {}", session.agent_name(contact));
    if !contact.can_set_advising() {
        println!("  {}", "advising unavailable until an agent is assigned".bright_black());
    }
}
