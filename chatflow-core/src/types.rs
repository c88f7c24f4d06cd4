//! Domain types for the ChatFlow CRM.
//!
//! Everything here is plain data: serializable via serde, cheap to clone.
//! The only mutable state lives behind [`crate::registry::ContactRegistry`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a contact (`c1`, `c2`, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub String);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of an agent (`a1`, `a2`, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a contact.
///
/// Declaration order is the display order used by status tabs and reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Active,
    /// Agent-led engagement. Only reachable while an agent is assigned.
    Advising,
    Following,
    Closed,
    Inactive,
}

impl ContactStatus {
    /// All statuses in display order.
    pub fn all() -> &'static [ContactStatus] {
        &[
            ContactStatus::Active,
            ContactStatus::Advising,
            ContactStatus::Following,
            ContactStatus::Closed,
            ContactStatus::Inactive,
        ]
    }

    /// Machine key, identical to the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            ContactStatus::Active => "active",
            ContactStatus::Inactive => "inactive",
            ContactStatus::Closed => "closed",
            ContactStatus::Following => "following",
            ContactStatus::Advising => "advising",
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            ContactStatus::Active => "Active",
            ContactStatus::Inactive => "Inactive",
            ContactStatus::Closed => "Closed",
            ContactStatus::Following => "Following",
            ContactStatus::Advising => "Advising",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ContactStatus::all()
            .iter()
            .copied()
            .find(|status| status.key() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown status '{s}'; expected: active, advising, following, closed, inactive"
                )
            })
    }
}

/// Availability of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPresence {
    Online,
    Busy,
    Offline,
}

impl AgentPresence {
    pub fn all() -> &'static [AgentPresence] {
        &[AgentPresence::Online, AgentPresence::Busy, AgentPresence::Offline]
    }
}

impl fmt::Display for AgentPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentPresence::Online => write!(f, "online"),
            AgentPresence::Busy => write!(f, "busy"),
            AgentPresence::Offline => write!(f, "offline"),
        }
    }
}

/// Seniority band shown on the agent performance view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentLevel {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl fmt::Display for AgentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentLevel::Junior => write!(f, "Junior"),
            AgentLevel::Mid => write!(f, "Mid"),
            AgentLevel::Senior => write!(f, "Senior"),
            AgentLevel::Lead => write!(f, "Lead"),
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Contact,
    Agent,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::Contact => "Customer",
            Sender::Agent => "Agent",
            Sender::Bot => "Bot",
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A customer or prospect tracked through a status lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub country: String,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    #[serde(default)]
    pub last_message: String,
    pub last_message_at: NaiveDateTime,
    #[serde(default)]
    pub unread_count: u32,
    pub avatar_initials: String,
}

impl Contact {
    /// Whether this contact may move to [`ContactStatus::Advising`].
    pub fn can_set_advising(&self) -> bool {
        self.agent.is_some()
    }

    /// `status == advising ⇒ agent present`.
    pub fn is_consistent(&self) -> bool {
        self.status != ContactStatus::Advising || self.agent.is_some()
    }
}

/// Performance figures for an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub conversations_handled: u32,
    pub avg_response_minutes: f64,
    /// Percentage, 0–100.
    pub satisfaction: u8,
    /// Percentage, 0–100.
    pub resolved_rate: u8,
    pub level: AgentLevel,
}

/// A staff member who may be assigned to contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub avatar_initials: String,
    #[serde(default)]
    pub active_chats: u32,
    pub presence: AgentPresence,
    pub stats: AgentStats,
}

/// One chat message exchanged with a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub contact_id: ContactId,
    pub content: String,
    pub timestamp: NaiveDateTime,
    pub sender: Sender,
    pub sender_name: String,
}

/// Units sold and revenue for one product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product: String,
    pub units: u32,
    pub revenue: u64,
}

/// Closed sales attributed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSales {
    pub agent: AgentId,
    pub sales: u32,
    pub revenue: u64,
}

/// Conversation outcomes attributed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub agent: AgentId,
    pub resolved: u32,
    pub pending: u32,
    pub satisfaction: u8,
}

/// Headline figures for the dashboard KPI block.
///
/// These are account-wide totals, not counts over the loaded contacts.
/// Trends are percentage changes against the previous period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_contacts: u32,
    pub active_contacts: u32,
    pub new_prospects: u32,
    pub open_conversations: u32,
    pub avg_response_minutes: f64,
    /// Percentage, 0–100.
    pub satisfaction: u8,
    #[serde(default)]
    pub contacts_trend: i32,
    #[serde(default)]
    pub active_trend: i32,
    #[serde(default)]
    pub prospects_trend: i32,
}

/// Conversations received and resolved on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyConversations {
    pub day: String,
    pub conversations: u32,
    pub resolved: u32,
}

/// New contacts and conversations in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    pub month: String,
    pub contacts: u32,
    pub conversations: u32,
}

/// Static report inputs that are not derived from contacts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analytics {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub weekly: Vec<DailyConversations>,
    #[serde(default)]
    pub monthly: Vec<MonthlyActivity>,
    #[serde(default)]
    pub product_sales: Vec<ProductSales>,
    #[serde(default)]
    pub agent_sales: Vec<AgentSales>,
    #[serde(default)]
    pub agent_performance: Vec<AgentPerformance>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(status: ContactStatus, agent: Option<&str>) -> Contact {
        Contact {
            id: ContactId::from("c1"),
            name: "Maria Lopez".to_string(),
            company: "TechCorp".to_string(),
            phone: "+52 55 1234 5678".to_string(),
            email: "maria@techcorp.mx".to_string(),
            country: "Mexico".to_string(),
            status,
            agent: agent.map(AgentId::from),
            last_message: String::new(),
            last_message_at: chrono::NaiveDate::from_ymd_opt(2026, 2, 11)
                .and_then(|d| d.and_hms_opt(10, 30, 0))
                .expect("valid timestamp"),
            unread_count: 0,
            avatar_initials: "ML".to_string(),
        }
    }

    #[test]
    fn newtype_display() {
        assert_eq!(ContactId::from("c1").to_string(), "c1");
        assert_eq!(AgentId::from("a7").to_string(), "a7");
        assert_eq!(MessageId::from("m3").to_string(), "m3");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Advising".parse::<ContactStatus>(), Ok(ContactStatus::Advising));
        assert_eq!(" closed ".parse::<ContactStatus>(), Ok(ContactStatus::Closed));
        let err = "prospect".parse::<ContactStatus>().unwrap_err();
        assert!(err.contains("prospect"));
    }

    #[test]
    fn display_order_matches_status_tabs() {
        let keys: Vec<&str> = ContactStatus::all().iter().map(ContactStatus::key).collect();
        assert_eq!(keys, vec!["active", "advising", "following", "closed", "inactive"]);
        let mut sorted = ContactStatus::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, ContactStatus::all());
    }

    #[test]
    fn status_key_matches_serde() {
        for status in ContactStatus::all() {
            let yaml = serde_yaml::to_string(status).expect("serialize");
            assert_eq!(yaml.trim(), status.key());
        }
    }

    #[test]
    fn advising_requires_agent() {
        assert!(!contact(ContactStatus::Advising, None).is_consistent());
        assert!(contact(ContactStatus::Advising, Some("a1")).is_consistent());
        assert!(contact(ContactStatus::Closed, None).is_consistent());
        assert!(contact(ContactStatus::Closed, Some("a1")).is_consistent());
    }

    #[test]
    fn can_set_advising_follows_agent() {
        assert!(!contact(ContactStatus::Following, None).can_set_advising());
        assert!(contact(ContactStatus::Following, Some("a2")).can_set_advising());
    }

    #[test]
    fn contact_without_agent_omits_field() {
        let yaml = serde_yaml::to_string(&contact(ContactStatus::Active, None)).expect("serialize");
        assert!(!yaml.contains("agent:"));
    }
}
