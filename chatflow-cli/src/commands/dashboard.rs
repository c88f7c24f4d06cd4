//! `chatflow dashboard`: KPI block, weekly and monthly activity, recent contacts.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use chatflow_core::{
    query::{self, StatusCounts},
    Contact, ContactStatus, DailyConversations, DashboardStats, MonthlyActivity,
};
use chatflow_report::filters::group_digits;

use super::conversations::preview;
use super::Session;

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// How many recent contacts to list.
    #[arg(long, default_value_t = 5)]
    pub recent: usize,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct DashboardJson<'a> {
    stats: &'a DashboardStats,
    status_counts: StatusCounts,
    weekly: &'a [DailyConversations],
    monthly: &'a [MonthlyActivity],
    recent_contacts: Vec<&'a Contact>,
}

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "metric")]
    metric: &'static str,
    #[tabled(rename = "value")]
    value: String,
    #[tabled(rename = "trend")]
    trend: String,
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "day")]
    day: String,
    #[tabled(rename = "received")]
    received: u32,
    #[tabled(rename = "resolved")]
    resolved: u32,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "month")]
    month: String,
    #[tabled(rename = "new contacts")]
    contacts: u32,
    #[tabled(rename = "conversations")]
    conversations: u32,
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "last message")]
    preview: String,
    #[tabled(rename = "at")]
    at: String,
}

impl DashboardArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let analytics = &session.crm.analytics;
        let contacts = || session.crm.registry.contacts();
        let counts = StatusCounts::of(contacts());
        let recent = query::recent_contacts(contacts(), self.recent);

        if self.json {
            let payload = DashboardJson {
                stats: &analytics.stats,
                status_counts: counts,
                weekly: &analytics.weekly,
                monthly: &analytics.monthly,
                recent_contacts: recent,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize dashboard JSON")?
            );
            return Ok(());
        }

        print_kpis(&analytics.stats);
        print_status_share(&counts);

        if !analytics.weekly.is_empty() {
            println!("\n{}", "This week".bold());
            let rows: Vec<WeekRow> = analytics
                .weekly
                .iter()
                .map(|d| WeekRow {
                    day: d.day.clone(),
                    received: d.conversations,
                    resolved: d.resolved,
                })
                .collect();
            print_table(rows);
        }

        if !analytics.monthly.is_empty() {
            println!("\n{}", "Monthly trend".bold());
            let rows: Vec<MonthRow> = analytics
                .monthly
                .iter()
                .map(|m| MonthRow {
                    month: m.month.clone(),
                    contacts: m.contacts,
                    conversations: m.conversations,
                })
                .collect();
            print_table(rows);
        }

        println!("\n{}", "Recent activity".bold());
        if recent.is_empty() {
            println!("No contacts yet.");
            return Ok(());
        }
        let rows: Vec<RecentRow> = recent
            .iter()
            .map(|c| RecentRow {
                id: c.id.to_string(),
                name: c.name.clone(),
                status: c.status.label().to_string(),
                preview: preview(&c.last_message),
                at: c.last_message_at.format("%Y-%m-%d %H:%M").to_string(),
            })
            .collect();
        print_table(rows);
        Ok(())
    }
}

fn print_kpis(stats: &DashboardStats) {
    let rows = vec![
        KpiRow {
            metric: "Total contacts",
            value: group_digits(stats.total_contacts.into()),
            trend: trend(stats.contacts_trend),
        },
        KpiRow {
            metric: "Active contacts",
            value: group_digits(stats.active_contacts.into()),
            trend: trend(stats.active_trend),
        },
        KpiRow {
            metric: "New prospects",
            value: group_digits(stats.new_prospects.into()),
            trend: trend(stats.prospects_trend),
        },
        KpiRow {
            metric: "Open chats",
            value: group_digits(stats.open_conversations.into()),
            trend: String::new(),
        },
        KpiRow {
            metric: "Avg response",
            value: format!("{:.1} min", stats.avg_response_minutes),
            trend: String::new(),
        },
        KpiRow {
            metric: "Satisfaction",
            value: format!("{}%", stats.satisfaction),
            trend: String::new(),
        },
    ];
    print_table(rows);
}

/// `Active 25% | Advising 25% | …` over the loaded contacts.
fn print_status_share(counts: &StatusCounts) {
    if counts.total == 0 {
        return;
    }
    let shares: Vec<String> = ContactStatus::all()
        .iter()
        .map(|s| {
            let pct = (counts.get(*s) as f64 * 100.0 / counts.total as f64).round();
            format!("{} {pct}%", s.label())
        })
        .collect();
    println!("Chats by status: {}", shares.join(" | "));
}

fn trend(pct: i32) -> String {
    match pct {
        0 => String::new(),
        p if p > 0 => format!("+{p}%"),
        p => format!("{p}%"),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
