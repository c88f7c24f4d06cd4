//! Property: for any sequence of assign / remove / change-status calls, every
//! contact satisfies `status == advising ⇒ agent assigned` after each call.

use chatflow_core::{AgentId, ContactId, ContactStatus, Crm, MutationOutcome, NotFound};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Assign(String, String),
    Remove(String),
    Status(String, ContactStatus),
}

fn arb_contact() -> impl Strategy<Value = String> {
    // c1..c12 exist in the bundled data; c13 never does.
    (1u8..=13).prop_map(|n| format!("c{n}"))
}

fn arb_agent() -> impl Strategy<Value = String> {
    // a1..a7 exist; a8 never does.
    (1u8..=8).prop_map(|n| format!("a{n}"))
}

fn arb_status() -> impl Strategy<Value = ContactStatus> {
    prop_oneof![
        Just(ContactStatus::Active),
        Just(ContactStatus::Inactive),
        Just(ContactStatus::Closed),
        Just(ContactStatus::Following),
        Just(ContactStatus::Advising),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_contact(), arb_agent()).prop_map(|(c, a)| Op::Assign(c, a)),
        arb_contact().prop_map(Op::Remove),
        (arb_contact(), arb_status()).prop_map(|(c, s)| Op::Status(c, s)),
    ]
}

fn apply(crm: &mut Crm, op: &Op) -> Result<MutationOutcome, NotFound> {
    match op {
        Op::Assign(c, a) => crm
            .registry
            .assign_agent(&ContactId::from(c.as_str()), &AgentId::from(a.as_str())),
        Op::Remove(c) => crm.registry.remove_agent(&ContactId::from(c.as_str())),
        Op::Status(c, s) => crm.registry.change_status(&ContactId::from(c.as_str()), *s),
    }
}

proptest! {
    #[test]
    fn invariant_holds_after_every_call(ops in prop::collection::vec(arb_op(), 0..64)) {
        let mut crm = Crm::bundled().expect("bundled dataset");
        for op in &ops {
            let before = crm.registry.snapshot();
            let result = apply(&mut crm, op);
            prop_assert!(crm.registry.is_consistent(), "violated after {:?}", op);
            match result {
                Ok(MutationOutcome::Applied) => {}
                Ok(MutationOutcome::Blocked(_)) | Err(_) => {
                    prop_assert_eq!(crm.registry.snapshot(), before);
                }
            }
        }
    }

    #[test]
    fn status_changes_never_touch_agents(
        contact in 1u8..=12,
        statuses in prop::collection::vec(arb_status(), 1..16),
    ) {
        let mut crm = Crm::bundled().expect("bundled dataset");
        let id = ContactId::from(format!("c{contact}"));
        let agent = crm.registry.get(&id).and_then(|c| c.agent.clone());
        for status in statuses {
            crm.registry.change_status(&id, status).expect("contact exists");
            prop_assert_eq!(crm.registry.get(&id).and_then(|c| c.agent.clone()), agent.clone());
        }
    }
}
