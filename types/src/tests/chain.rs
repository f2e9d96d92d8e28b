// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    attribute::RevocationAttribute,
    error::RevocationError,
    events::{self, Event, EventHash, EventList},
};
use claims::{assert_matches, assert_ok};

/// Builds a valid chain of `count` events starting at index 0.
pub fn event_chain(count: usize) -> Vec<Event> {
    let mut events = Vec::with_capacity(count);
    let mut parent_hash = EventHash::default();
    for index in 0..count as u64 {
        let event = Event {
            index,
            e: RevocationAttribute::from_bytes(vec![index as u8 + 1]),
            parent_hash,
        };
        parent_hash = event.hash().unwrap();
        events.push(event);
    }
    events
}

#[test]
fn test_valid_chain() {
    assert_ok!(events::validate_chain(&[]));
    assert_ok!(events::validate_chain(&event_chain(1)));
    assert_ok!(events::validate_chain(&event_chain(10)));
}

#[test]
fn test_chain_with_index_gap() {
    let mut events = event_chain(5);
    events.remove(2);
    assert_matches!(
        events::validate_chain(&events),
        Err(RevocationError::InvalidUpdate(_))
    );
}

#[test]
fn test_chain_with_broken_parent_hash() {
    let mut events = event_chain(4);
    events[2].parent_hash = EventHash([7; 32]);
    assert_matches!(
        events::validate_chain(&events),
        Err(RevocationError::InvalidUpdate(_))
    );
}

#[test]
fn test_genesis_must_chain_from_zero() {
    let mut events = event_chain(1);
    events[0].parent_hash = EventHash([1; 32]);
    assert_matches!(
        events::validate_chain(&events),
        Err(RevocationError::InvalidUpdate(_))
    );
}

#[test]
fn test_event_hash_is_positional() {
    let events = event_chain(3);
    let mut moved = events[1].clone();
    moved.index = 2;
    assert_ne!(events[1].hash().unwrap(), moved.hash().unwrap());
}

#[test]
fn test_flatten_abutting_ranges() {
    let events = event_chain(48);
    let lists = vec![
        EventList::new(events[0..16].to_vec()),
        EventList::new(events[16..32].to_vec()),
        EventList::new(events[32..48].to_vec()),
    ];
    let flattened = assert_ok!(EventList::flatten(lists));
    assert_eq!(flattened.events, events);
}

#[test]
fn test_flatten_rejects_gap() {
    let events = event_chain(48);
    let lists = vec![
        EventList::new(events[0..16].to_vec()),
        EventList::new(events[32..48].to_vec()),
    ];
    assert_matches!(
        EventList::flatten(lists),
        Err(RevocationError::InvalidUpdate(_))
    );
}
