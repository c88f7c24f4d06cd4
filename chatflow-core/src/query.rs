//! Read-only projections used by views and reports.
//!
//! Nothing here mutates; every function takes shared references and returns
//! borrowed or owned views.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Agent, AgentPresence, Contact, ContactId, ContactStatus, Message};

/// Contacts shown per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 8;

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Status tab plus free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    /// `None` means every status.
    pub status: Option<ContactStatus>,
    pub search: Option<String>,
}

impl ContactFilter {
    /// Name, company and email match case-insensitively; phone matches as typed.
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(status) = self.status {
            if contact.status != status {
                return false;
            }
        }
        let Some(needle) = self.search.as_deref().filter(|s| !s.is_empty()) else {
            return true;
        };
        let lowered = needle.to_lowercase();
        contact.name.to_lowercase().contains(&lowered)
            || contact.company.to_lowercase().contains(&lowered)
            || contact.email.to_lowercase().contains(&lowered)
            || contact.phone.contains(needle)
    }

    pub fn apply<'a, I>(&self, contacts: I) -> Vec<&'a Contact>
    where
        I: IntoIterator<Item = &'a Contact>,
    {
        contacts.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Per-status counts over a contact collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: BTreeMap<ContactStatus, usize>,
}

impl StatusCounts {
    pub fn of<'a, I>(contacts: I) -> Self
    where
        I: IntoIterator<Item = &'a Contact>,
    {
        let mut counts = StatusCounts::default();
        for contact in contacts {
            counts.total += 1;
            *counts.by_status.entry(contact.status).or_default() += 1;
        }
        counts
    }

    pub fn get(&self, status: ContactStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a larger list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based pages of `per_page`.
///
/// Page 0 is read as page 1. A page past the end has no items but still
/// reports the real totals.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();
    Page { items, page, per_page, total_items, total_pages }
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Inbox ordering: search over name and company, newest message first.
pub fn conversation_list<'a, I>(contacts: I, search: Option<&str>) -> Vec<&'a Contact>
where
    I: IntoIterator<Item = &'a Contact>,
{
    let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());
    let mut list: Vec<&Contact> = contacts
        .into_iter()
        .filter(|c| match &needle {
            Some(n) => c.name.to_lowercase().contains(n) || c.company.to_lowercase().contains(n),
            None => true,
        })
        .collect();
    list.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    list
}

/// The `n` contacts with the newest last message, newest first.
///
/// Ties keep input order.
pub fn recent_contacts<'a, I>(contacts: I, n: usize) -> Vec<&'a Contact>
where
    I: IntoIterator<Item = &'a Contact>,
{
    let mut recent: Vec<&Contact> = contacts.into_iter().collect();
    recent.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    recent.truncate(n);
    recent
}

/// Messages exchanged with one contact, oldest first.
pub fn transcript<'a>(messages: &'a [Message], contact: &ContactId) -> Vec<&'a Message> {
    let mut thread: Vec<&Message> =
        messages.iter().filter(|m| &m.contact_id == contact).collect();
    thread.sort_by_key(|m| m.timestamp);
    thread
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Case-insensitive search over agent name and role.
pub fn filter_agents<'a>(agents: &'a [Agent], search: Option<&str>) -> Vec<&'a Agent> {
    let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());
    agents
        .iter()
        .filter(|a| match &needle {
            Some(n) => a.name.to_lowercase().contains(n) || a.role.to_lowercase().contains(n),
            None => true,
        })
        .collect()
}

/// Agents by conversations handled, busiest first. Ties keep input order.
pub fn agent_ranking<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Vec<&'a Agent> {
    let mut ranked: Vec<&Agent> = agents.into_iter().collect();
    ranked.sort_by(|a, b| b.stats.conversations_handled.cmp(&a.stats.conversations_handled));
    ranked
}

pub fn presence_counts<'a>(
    agents: impl IntoIterator<Item = &'a Agent>,
) -> BTreeMap<AgentPresence, usize> {
    let mut counts: BTreeMap<AgentPresence, usize> =
        AgentPresence::all().iter().map(|p| (*p, 0)).collect();
    for agent in agents {
        *counts.entry(agent.presence).or_default() += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentId, AgentLevel, AgentStats, MessageId, Sender};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn contact(id: &str, name: &str, status: ContactStatus, last: NaiveDateTime) -> Contact {
        Contact {
            id: ContactId::from(id),
            name: name.to_string(),
            company: format!("{name} Corp"),
            phone: "+52 55 1234 5678".to_string(),
            email: format!("{id}@example.mx"),
            country: "Mexico".to_string(),
            status,
            agent: None,
            last_message: String::new(),
            last_message_at: last,
            unread_count: 0,
            avatar_initials: "XX".to_string(),
        }
    }

    fn agent(id: &str, name: &str, role: &str, handled: u32, presence: AgentPresence) -> Agent {
        Agent {
            id: AgentId::from(id),
            name: name.to_string(),
            role: role.to_string(),
            avatar_initials: "AG".to_string(),
            active_chats: 0,
            presence,
            stats: AgentStats {
                conversations_handled: handled,
                avg_response_minutes: 3.0,
                satisfaction: 90,
                resolved_rate: 85,
                level: AgentLevel::Mid,
            },
        }
    }

    #[test]
    fn filter_by_status_and_search() {
        let contacts = vec![
            contact("c1", "Maria Lopez", ContactStatus::Active, at(11, 10)),
            contact("c2", "Juan Ramirez", ContactStatus::Advising, at(11, 9)),
            contact("c3", "Sofia Martinez", ContactStatus::Active, at(11, 8)),
        ];
        let filter = ContactFilter {
            status: Some(ContactStatus::Active),
            search: Some("MARIA".to_string()),
        };
        let hits = filter.apply(&contacts);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ContactId::from("c1"));

        let by_phone = ContactFilter { status: None, search: Some("1234".to_string()) };
        assert_eq!(by_phone.apply(&contacts).len(), 3);

        let empty_search = ContactFilter { status: None, search: Some(String::new()) };
        assert_eq!(empty_search.apply(&contacts).len(), 3);
    }

    #[test]
    fn status_counts_cover_all_contacts() {
        let contacts = vec![
            contact("c1", "A", ContactStatus::Active, at(1, 1)),
            contact("c2", "B", ContactStatus::Active, at(1, 1)),
            contact("c3", "C", ContactStatus::Closed, at(1, 1)),
        ];
        let counts = StatusCounts::of(&contacts);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.get(ContactStatus::Active), 2);
        assert_eq!(counts.get(ContactStatus::Closed), 1);
        assert_eq!(counts.get(ContactStatus::Advising), 0);
    }

    #[test]
    fn pagination_boundaries() {
        let items: Vec<u32> = (1..=12).collect();
        let first = paginate(items.clone(), 1, 8);
        assert_eq!(first.items, (1..=8).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 2);

        let second = paginate(items.clone(), 2, 8);
        assert_eq!(second.items, vec![9, 10, 11, 12]);

        let past_end = paginate(items.clone(), 3, 8);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_items, 12);

        let zero = paginate(items, 0, 8);
        assert_eq!(zero.page, 1);

        let none: Page<u32> = paginate(Vec::new(), 1, 8);
        assert_eq!(none.total_pages, 0);
    }

    #[test]
    fn conversation_list_newest_first() {
        let contacts = vec![
            contact("c1", "Maria", ContactStatus::Active, at(10, 12)),
            contact("c2", "Juan", ContactStatus::Active, at(11, 9)),
            contact("c3", "Sofia", ContactStatus::Active, at(9, 16)),
        ];
        let ids: Vec<&str> = conversation_list(&contacts, None)
            .iter()
            .map(|c| c.id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["c2", "c1", "c3"]);

        let by_company = conversation_list(&contacts, Some("sofia corp"));
        assert_eq!(by_company.len(), 1);
    }

    #[test]
    fn recent_contacts_newest_first_and_capped() {
        let contacts = vec![
            contact("c1", "Maria", ContactStatus::Active, at(10, 12)),
            contact("c2", "Juan", ContactStatus::Closed, at(11, 9)),
            contact("c3", "Sofia", ContactStatus::Active, at(9, 16)),
            contact("c4", "Pedro", ContactStatus::Inactive, at(11, 9)),
        ];
        let ids = |list: Vec<&Contact>| -> Vec<String> {
            list.iter().map(|c| c.id.0.clone()).collect()
        };
        assert_eq!(ids(recent_contacts(&contacts, 3)), vec!["c2", "c4", "c1"]);
        assert_eq!(recent_contacts(&contacts, 10).len(), 4);
        assert!(recent_contacts(&contacts, 0).is_empty());
        assert_eq!(contacts[0].id, ContactId::from("c1"), "input untouched");
    }

    #[test]
    fn transcript_is_chronological() {
        let msg = |id: &str, contact: &str, ts: NaiveDateTime| Message {
            id: MessageId::from(id),
            contact_id: ContactId::from(contact),
            content: id.to_string(),
            timestamp: ts,
            sender: Sender::Bot,
            sender_name: "Bot".to_string(),
        };
        let messages = vec![
            msg("m2", "c1", at(11, 10)),
            msg("m9", "c2", at(11, 8)),
            msg("m1", "c1", at(11, 9)),
        ];
        let thread = transcript(&messages, &ContactId::from("c1"));
        let ids: Vec<&str> = thread.iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn agent_search_ranking_and_presence() {
        let agents = vec![
            agent("a1", "Carlos Mendoza", "Support", 342, AgentPresence::Online),
            agent("a2", "Laura Garcia", "Sales", 278, AgentPresence::Busy),
            agent("a4", "Ana Rivera", "Sales", 310, AgentPresence::Online),
        ];
        assert_eq!(filter_agents(&agents, Some("sales")).len(), 2);
        assert_eq!(filter_agents(&agents, Some("carlos")).len(), 1);

        let ranked: Vec<&str> = agent_ranking(&agents).iter().map(|a| a.id.0.as_str()).collect();
        assert_eq!(ranked, vec!["a1", "a4", "a2"]);

        let presence = presence_counts(&agents);
        assert_eq!(presence[&AgentPresence::Online], 2);
        assert_eq!(presence[&AgentPresence::Busy], 1);
        assert_eq!(presence[&AgentPresence::Offline], 0);
    }
}
