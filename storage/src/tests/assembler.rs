// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{assemble_updates, AccumulatorRecord, EventRecord};
use bytes::Bytes;
use revocation_types::{
    CredentialTypeIdentifier, Event, EventHash, RevocationAttribute, SignedAccumulator,
};

fn cred_type() -> CredentialTypeIdentifier {
    "irma-demo.mijn.ageLower".parse().unwrap()
}

fn accumulator_record(counter: u32) -> AccumulatorRecord {
    AccumulatorRecord::new(&cred_type(), &SignedAccumulator {
        data: Bytes::from(vec![counter as u8; 4]),
        pk_counter: counter,
    })
}

fn event_record(counter: u32, index: u64) -> EventRecord {
    EventRecord::new(&cred_type(), counter, Event {
        index,
        e: RevocationAttribute::from_bytes(vec![index as u8]),
        parent_hash: EventHash::default(),
    })
}

#[test]
fn test_assemble_seeds_one_update_per_accumulator() {
    let accumulators = [accumulator_record(1), accumulator_record(2)];
    let updates = assemble_updates(&accumulators, &[]);
    assert_eq!(updates.len(), 2);
    assert!(updates[&1].events.is_empty());
    assert_eq!(updates[&1].signed_accumulator.pk_counter, 1);
}

#[test]
fn test_assemble_sorts_events_by_index() {
    let accumulators = [accumulator_record(1)];
    // Subscribers may receive forwarded updates out of order; rows come
    // back in whatever order they were written.
    let events = [
        event_record(1, 5),
        event_record(1, 3),
        event_record(1, 4),
        event_record(1, 6),
    ];
    let updates = assemble_updates(&accumulators, &events);
    let indices: Vec<u64> = updates[&1].events.iter().map(|event| event.index).collect();
    assert_eq!(indices, vec![3, 4, 5, 6]);
}

#[test]
fn test_assemble_drops_events_without_accumulator() {
    let accumulators = [accumulator_record(1)];
    let events = [event_record(1, 0), event_record(9, 0)];
    let updates = assemble_updates(&accumulators, &events);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[&1].events.len(), 1);
}
