//! Property-Based Tests for the actor update protocol
//!
//! Uses `proptest` to check local update policies and state transfer
//! between proxies under random property sets.

use proptest::prelude::*;

use delta_core::actor::BaseActorObject;
use delta_core::actor_type::ActorType;
use delta_core::property::{ActorProperty, GenericProperty, PropertyValue};
use delta_game::proxy::{GameActorProxy, GameActorProxyPtr};
use delta_game::{
    ActorUpdateMessage, LocalActorUpdatePolicy, Message, MessageType, PropertyUpdateOutcome, UpdateParameter,
};

const NAMES: [&str; 5] = ["Speed", "Armor", "Fuel", "Heading", "Ammo"];

fn proxy(values: &[i32]) -> GameActorProxyPtr {
    let t = ActorType::new("Tank", "vehicles", "").into_ptr();
    let mut proxy = GameActorProxy::new(t, "Tank_01");
    for (name, value) in NAMES.iter().zip(values) {
        proxy = proxy.with_property(GenericProperty::new(name, PropertyValue::Int(*value)).into_ptr());
    }
    proxy.into_ptr()
}

fn update(values: &[i32]) -> Message {
    let mut message = Message::new(MessageType::InfoActorUpdated);
    let mut body = ActorUpdateMessage::default();
    for (name, value) in NAMES.iter().zip(values) {
        body.add_update_parameter(UpdateParameter::new(name, PropertyValue::Int(*value)));
    }
    message.set_actor_update(body);
    message
}

fn value_of(proxy: &GameActorProxyPtr, name: &str) -> PropertyValue {
    proxy.borrow().property(name).unwrap().value()
}

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_values() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-1000i32..1000, NAMES.len())
}

fn arb_accept_list() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(NAMES.to_vec(), 0..=NAMES.len())
}

// ---------------------------------------------------------------------------
// Property: local update policies
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ignore_all_leaves_local_actor_untouched(initial in arb_values(), incoming in arb_values()) {
        let p = proxy(&initial);
        p.borrow_mut().set_local_actor_update_policy(LocalActorUpdatePolicy::IgnoreAll);
        let report = p.borrow_mut().apply_actor_update(&update(&incoming), true);
        prop_assert!(report.dropped);
        for (name, value) in NAMES.iter().zip(&initial) {
            prop_assert_eq!(value_of(&p, name), PropertyValue::Int(*value));
        }
    }

    #[test]
    fn filter_applies_exactly_the_accept_list(
        initial in arb_values(),
        incoming in arb_values(),
        accepted in arb_accept_list(),
    ) {
        let p = proxy(&initial);
        {
            let mut guard = p.borrow_mut();
            guard.set_local_actor_update_policy(LocalActorUpdatePolicy::AcceptWithPropertyFilter);
            for name in &accepted {
                guard.add_property_to_local_update_accept_filter(name);
            }
        }
        let report = p.borrow_mut().apply_actor_update(&update(&incoming), true);
        prop_assert_eq!(report.applied_count(), accepted.len());

        for ((name, before), after) in NAMES.iter().zip(&initial).zip(&incoming) {
            let expected = if accepted.contains(name) { after } else { before };
            prop_assert_eq!(value_of(&p, name), PropertyValue::Int(*expected));
            if !accepted.contains(name) {
                prop_assert_eq!(report.outcome(name), Some(&PropertyUpdateOutcome::SkippedFiltered));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: a full update transfers state to a fresh proxy
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn full_update_transfers_state(values in arb_values()) {
        let source = proxy(&values);
        let target = proxy(&[0; NAMES.len()]);
        target.borrow_mut().set_remote(true);

        let mut message = Message::new(MessageType::InfoActorUpdated);
        source.borrow().populate_actor_update(&mut message, &[]);
        let report = target.borrow_mut().apply_actor_update(&message, true);

        prop_assert!(!report.dropped);
        for name in NAMES {
            prop_assert_eq!(value_of(&target, name), value_of(&source, name));
        }
    }
}
