//! `chatflow conversations`: inbox and transcripts.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use chatflow_core::{query, ContactId, Sender};

use super::{status_badge, Session};

const PREVIEW_CHARS: usize = 48;

#[derive(Subcommand, Debug)]
pub enum ConversationsCommand {
    /// Inbox, newest message first.
    List {
        /// Match contact name or company.
        #[arg(long, short = 'q')]
        search: Option<String>,
    },

    /// Full transcript for one contact, oldest message first.
    Show { id: String },
}

pub fn run(cmd: ConversationsCommand, session: &Session) -> Result<()> {
    match cmd {
        ConversationsCommand::List { search } => list(search.as_deref(), session),
        ConversationsCommand::Show { id } => show(&ContactId::from(id), session),
    }
}

#[derive(Tabled)]
struct InboxRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "contact")]
    contact: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "last message")]
    preview: String,
    #[tabled(rename = "time")]
    time: String,
    #[tabled(rename = "unread")]
    unread: u32,
}

fn list(search: Option<&str>, session: &Session) -> Result<()> {
    let inbox = query::conversation_list(session.crm.registry.contacts(), search);
    if inbox.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }
    let rows: Vec<InboxRow> = inbox
        .iter()
        .map(|c| InboxRow {
            id: c.id.to_string(),
            contact: format!("{} ({})", c.name, c.company),
            status: c.status.label().to_string(),
            preview: preview(&c.last_message),
            time: c.last_message_at.format("%H:%M").to_string(),
            unread: c.unread_count,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(id: &ContactId, session: &Session) -> Result<()> {
    let contact = session
        .crm
        .registry
        .get(id)
        .with_context(|| format!("contact '{id}' not found"))?;
    println!(
        "{} · {} · {} · agent: {}",
        contact.name.bold(),
        contact.company,
        status_badge(contact.status),
        session.agent_name(contact)
    );

    let thread = query::transcript(&session.crm.messages, id);
    if thread.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in thread {
        let who = match message.sender {
            Sender::Contact => message.sender_name.cyan(),
            Sender::Agent => message.sender_name.green(),
            Sender::Bot => message.sender_name.bright_black(),
        };
        println!(
            "[{}] {} ({})",
            message.timestamp.format("%H:%M"),
            who,
            message.sender.label()
        );
        println!("  {}", message.content);
    }
    Ok(())
}

pub(super) fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}…")
}
