//! Contact registry: sole owner of contact state.
//!
//! # Invariant
//!
//! For every contact, at all times:
//!
//! ```text
//! status == advising  ⇒  agent is assigned
//! ```
//!
//! The three mutation entry points ([`ContactRegistry::assign_agent`],
//! [`ContactRegistry::remove_agent`], [`ContactRegistry::change_status`]) are
//! the only way to change a contact once the registry is built, and each one
//! re-checks the rule against current state. Callers get shared references or
//! owned snapshots back, never `&mut Contact`.
//!
//! # Outcomes
//!
//! A blocked transition is an ordinary result (`Ok(MutationOutcome::Blocked)`),
//! not an error. `Err(NotFound)` is reserved for ids that do not resolve.

use std::collections::HashMap;
use std::fmt;

use crate::directory::AgentDirectory;
use crate::error::{NotFound, RegistryError};
use crate::types::{Agent, AgentId, Contact, ContactId, ContactStatus};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// `remove_agent` on an advising contact.
    AgentRemovalBlocked,
    /// `change_status(advising)` on a contact without an agent.
    StatusChangeBlocked,
}

impl BlockReason {
    /// Stable machine key.
    pub fn key(&self) -> &'static str {
        match self {
            BlockReason::AgentRemovalBlocked => "agent_removal_blocked",
            BlockReason::StatusChangeBlocked => "status_change_blocked",
        }
    }

    /// What the user should do to unblock.
    pub fn hint(&self) -> &'static str {
        match self {
            BlockReason::AgentRemovalBlocked => "change the status away from advising first",
            BlockReason::StatusChangeBlocked => "assign an agent first",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::AgentRemovalBlocked => {
                write!(f, "advising contacts must keep an assigned agent")
            }
            BlockReason::StatusChangeBlocked => write!(f, "advising requires an assigned agent"),
        }
    }
}

/// Result of a mutation whose references resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Blocked(BlockReason),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

// ---------------------------------------------------------------------------
// ContactRegistry
// ---------------------------------------------------------------------------

/// Authoritative contact collection bound to an [`AgentDirectory`].
#[derive(Debug, Clone)]
pub struct ContactRegistry<D> {
    contacts: Vec<Contact>,
    index: HashMap<ContactId, usize>,
    directory: D,
    revision: u64,
}

impl<D: AgentDirectory> ContactRegistry<D> {
    /// Build a registry from initial data.
    ///
    /// Rejects duplicate contact ids, agent references the directory cannot
    /// resolve, and advising contacts without an agent.
    pub fn new(contacts: Vec<Contact>, directory: D) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(contacts.len());
        for (pos, contact) in contacts.iter().enumerate() {
            if index.insert(contact.id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateContact(contact.id.clone()));
            }
            if let Some(agent) = &contact.agent {
                if directory.resolve(agent).is_none() {
                    return Err(RegistryError::DanglingAgent {
                        contact: contact.id.clone(),
                        agent: agent.clone(),
                    });
                }
            }
            if !contact.is_consistent() {
                return Err(RegistryError::AdvisingWithoutAgent(contact.id.clone()));
            }
        }
        tracing::debug!(contacts = contacts.len(), "contact registry built");
        Ok(Self { contacts, index, directory, revision: 0 })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.index.get(id).map(|&pos| &self.contacts[pos])
    }

    /// Contacts in insertion order.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Owned copy of every contact, detached from the registry.
    pub fn snapshot(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Bumped every time a mutation actually changes a contact.
    ///
    /// A projection built at revision `r` is stale once this differs from `r`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The agent assigned to `contact`, resolved through the directory.
    pub fn assigned_agent(&self, contact: &Contact) -> Option<&Agent> {
        contact.agent.as_ref().and_then(|id| self.directory.resolve(id))
    }

    /// Whether `id` may currently move to advising.
    pub fn can_set_advising(&self, id: &ContactId) -> Result<bool, NotFound> {
        self.get(id)
            .map(Contact::can_set_advising)
            .ok_or_else(|| NotFound::Contact(id.clone()))
    }

    /// `true` when every contact satisfies the advising/agent rule.
    pub fn is_consistent(&self) -> bool {
        self.contacts.iter().all(Contact::is_consistent)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Assign (or reassign) `agent_id` to a contact. Status is left alone.
    pub fn assign_agent(
        &mut self,
        contact_id: &ContactId,
        agent_id: &AgentId,
    ) -> Result<MutationOutcome, NotFound> {
        let pos = self.position(contact_id)?;
        let agent = self
            .directory
            .resolve(agent_id)
            .ok_or_else(|| NotFound::Agent(agent_id.clone()))?;
        let resolved = agent.id.clone();

        let contact = &mut self.contacts[pos];
        if contact.agent.as_ref() == Some(&resolved) {
            tracing::debug!(contact = %contact_id, agent = %agent_id, "agent already assigned");
        } else {
            contact.agent = Some(resolved);
            self.revision += 1;
            tracing::info!(contact = %contact_id, agent = %agent_id, "agent assigned");
        }
        Ok(MutationOutcome::Applied)
    }

    /// Clear a contact's agent unless the contact is advising.
    pub fn remove_agent(&mut self, contact_id: &ContactId) -> Result<MutationOutcome, NotFound> {
        let pos = self.position(contact_id)?;
        let contact = &mut self.contacts[pos];

        if contact.status == ContactStatus::Advising {
            tracing::debug!(contact = %contact_id, "agent removal blocked while advising");
            return Ok(MutationOutcome::Blocked(BlockReason::AgentRemovalBlocked));
        }

        if contact.agent.take().is_some() {
            self.revision += 1;
            tracing::info!(contact = %contact_id, "agent removed");
        } else {
            tracing::debug!(contact = %contact_id, "no agent to remove");
        }
        Ok(MutationOutcome::Applied)
    }

    /// Move a contact to `new_status`.
    ///
    /// Entering advising requires an agent; leaving it keeps whatever agent
    /// is assigned. The agent is never changed here.
    pub fn change_status(
        &mut self,
        contact_id: &ContactId,
        new_status: ContactStatus,
    ) -> Result<MutationOutcome, NotFound> {
        let pos = self.position(contact_id)?;
        let contact = &mut self.contacts[pos];

        if new_status == ContactStatus::Advising && contact.agent.is_none() {
            tracing::debug!(contact = %contact_id, "advising blocked without agent");
            return Ok(MutationOutcome::Blocked(BlockReason::StatusChangeBlocked));
        }

        if contact.status == new_status {
            tracing::debug!(contact = %contact_id, status = %new_status, "status unchanged");
        } else {
            contact.status = new_status;
            self.revision += 1;
            tracing::info!(contact = %contact_id, status = %new_status, "status changed");
        }
        Ok(MutationOutcome::Applied)
    }

    fn position(&self, id: &ContactId) -> Result<usize, NotFound> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| NotFound::Contact(id.clone()))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::directory::StaticAgentDirectory;
    use crate::types::{AgentLevel, AgentPresence, AgentStats};
    use chrono::NaiveDate;

    fn agent(id: &str) -> Agent {
        Agent {
            id: AgentId::from(id),
            name: format!("Agent {id}"),
            role: "Sales".to_string(),
            avatar_initials: "AG".to_string(),
            active_chats: 1,
            presence: AgentPresence::Online,
            stats: AgentStats {
                conversations_handled: 100,
                avg_response_minutes: 2.5,
                satisfaction: 95,
                resolved_rate: 90,
                level: AgentLevel::Senior,
            },
        }
    }

    fn contact(id: &str, status: ContactStatus, agent: Option<&str>) -> Contact {
        Contact {
            id: ContactId::from(id),
            name: format!("Contact {id}"),
            company: "Acme".to_string(),
            phone: "+1 555 0100".to_string(),
            email: format!("{id}@acme.test"),
            country: "Mexico".to_string(),
            status,
            agent: agent.map(AgentId::from),
            last_message: String::new(),
            last_message_at: NaiveDate::from_ymd_opt(2026, 2, 11)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .expect("valid timestamp"),
            unread_count: 0,
            avatar_initials: "CT".to_string(),
        }
    }

    fn registry(contacts: Vec<Contact>) -> ContactRegistry<StaticAgentDirectory> {
        let dir = StaticAgentDirectory::new(vec![agent("a1"), agent("a2")]).expect("directory");
        ContactRegistry::new(contacts, dir).expect("registry")
    }

    fn id(s: &str) -> ContactId {
        ContactId::from(s)
    }

    #[test]
    fn assign_then_advise() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Active, None)]);
        assert_eq!(reg.assign_agent(&id("c1"), &AgentId::from("a1")), Ok(MutationOutcome::Applied));
        assert_eq!(
            reg.change_status(&id("c1"), ContactStatus::Advising),
            Ok(MutationOutcome::Applied)
        );
        let c = reg.get(&id("c1")).expect("contact");
        assert_eq!(c.status, ContactStatus::Advising);
        assert_eq!(c.agent, Some(AgentId::from("a1")));
    }

    #[test]
    fn advising_without_agent_is_blocked() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Following, None)]);
        let before = reg.get(&id("c1")).cloned();
        assert_eq!(
            reg.change_status(&id("c1"), ContactStatus::Advising),
            Ok(MutationOutcome::Blocked(BlockReason::StatusChangeBlocked))
        );
        assert_eq!(reg.get(&id("c1")).cloned(), before);
        assert_eq!(reg.revision(), 0);
    }

    #[test]
    fn removal_blocked_while_advising_every_time() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Advising, Some("a2"))]);
        for _ in 0..3 {
            assert_eq!(
                reg.remove_agent(&id("c1")),
                Ok(MutationOutcome::Blocked(BlockReason::AgentRemovalBlocked))
            );
            assert_eq!(reg.get(&id("c1")).and_then(|c| c.agent.clone()), Some(AgentId::from("a2")));
        }
    }

    #[test]
    fn leaving_advising_keeps_agent_and_frees_removal() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Advising, Some("a1"))]);
        assert!(reg.change_status(&id("c1"), ContactStatus::Closed).expect("found").is_applied());
        assert_eq!(reg.get(&id("c1")).and_then(|c| c.agent.clone()), Some(AgentId::from("a1")));
        assert!(reg.remove_agent(&id("c1")).expect("found").is_applied());
        assert_eq!(reg.get(&id("c1")).and_then(|c| c.agent.clone()), None);
    }

    #[test]
    fn unknown_references_are_not_found() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Active, None)]);
        let before = reg.snapshot();
        assert_eq!(
            reg.assign_agent(&id("c9"), &AgentId::from("a1")),
            Err(NotFound::Contact(id("c9")))
        );
        assert_eq!(
            reg.assign_agent(&id("c1"), &AgentId::from("a9")),
            Err(NotFound::Agent(AgentId::from("a9")))
        );
        assert_eq!(reg.remove_agent(&id("c9")), Err(NotFound::Contact(id("c9"))));
        assert_eq!(
            reg.change_status(&id("c9"), ContactStatus::Closed),
            Err(NotFound::Contact(id("c9")))
        );
        assert_eq!(reg.snapshot(), before);
    }

    #[test]
    fn revision_moves_only_on_real_change() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Active, Some("a1"))]);
        reg.assign_agent(&id("c1"), &AgentId::from("a1")).expect("found");
        reg.change_status(&id("c1"), ContactStatus::Active).expect("found");
        assert_eq!(reg.revision(), 0);
        reg.assign_agent(&id("c1"), &AgentId::from("a2")).expect("found");
        assert_eq!(reg.revision(), 1);
    }

    /// Runs `f` under a subscriber that keeps INFO and above as plain text.
    fn info_log(f: impl FnOnce()) -> String {
        #[derive(Clone, Default)]
        struct Buf(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Buf {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().expect("log buffer").extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buf = Buf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf8 log")
    }

    #[test]
    fn idempotent_mutations_stay_below_info() {
        let mut reg = registry(vec![
            contact("c1", ContactStatus::Active, Some("a1")),
            contact("c2", ContactStatus::Active, None),
        ]);
        let quiet = info_log(|| {
            reg.assign_agent(&id("c1"), &AgentId::from("a1")).expect("found");
            reg.remove_agent(&id("c2")).expect("found");
            reg.change_status(&id("c1"), ContactStatus::Active).expect("found");
        });
        assert_eq!(quiet, "");
        assert_eq!(reg.revision(), 0);

        let loud = info_log(|| {
            reg.assign_agent(&id("c1"), &AgentId::from("a2")).expect("found");
            reg.remove_agent(&id("c1")).expect("found");
            reg.change_status(&id("c2"), ContactStatus::Closed).expect("found");
        });
        assert!(loud.contains("agent assigned"), "{loud}");
        assert!(loud.contains("agent removed"), "{loud}");
        assert!(loud.contains("status changed"), "{loud}");
        assert_eq!(reg.revision(), 3);
    }

    #[test]
    fn can_set_advising_reports_current_state() {
        let mut reg = registry(vec![contact("c1", ContactStatus::Active, None)]);
        assert_eq!(reg.can_set_advising(&id("c1")), Ok(false));
        reg.assign_agent(&id("c1"), &AgentId::from("a2")).expect("found");
        assert_eq!(reg.can_set_advising(&id("c1")), Ok(true));
        assert!(reg.can_set_advising(&id("nope")).is_err());
    }

    #[test]
    fn construction_rejects_inconsistent_data() {
        let dir = StaticAgentDirectory::new(vec![agent("a1")]).expect("directory");
        let err = ContactRegistry::new(
            vec![contact("c1", ContactStatus::Advising, None)],
            dir.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::AdvisingWithoutAgent(_)));

        let err = ContactRegistry::new(
            vec![contact("c1", ContactStatus::Active, Some("ghost"))],
            dir.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DanglingAgent { .. }));

        let err = ContactRegistry::new(
            vec![
                contact("c1", ContactStatus::Active, None),
                contact("c1", ContactStatus::Closed, None),
            ],
            dir,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateContact(_)));
    }

    #[test]
    fn block_reason_display_and_hint() {
        assert!(BlockReason::StatusChangeBlocked.to_string().contains("assigned agent"));
        assert!(BlockReason::AgentRemovalBlocked.hint().contains("status"));
        assert_eq!(BlockReason::AgentRemovalBlocked.key(), "agent_removal_blocked");
    }
}
