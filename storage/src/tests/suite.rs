// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Backend-independent store tests, executed against every available
//! backend. SQL backends need a live database and are exercised by the
//! deployment's integration environment; the in-memory backend runs them
//! here.

use crate::{AccumulatorRecord, EventRecord, RevocationStore};
use claims::{assert_ok, assert_some};
use revocation_types::{
    crypto::AccumulatorAlgebra, testing::MockAlgebra, CredentialTypeIdentifier, Event,
    IssuanceRecord, IssuerIdentifier, RevocationAttribute, SignedAccumulator,
};

fn cred_type() -> CredentialTypeIdentifier {
    "irma-demo.mijn.ageLower".parse().unwrap()
}

fn issuer() -> IssuerIdentifier {
    "irma-demo.mijn".parse().unwrap()
}

/// A signed accumulator and `events` chained events for the given counter.
fn stream(counter: u32, events: usize) -> (SignedAccumulator, Vec<Event>) {
    let (sk, pk) = MockAlgebra::keypair(&issuer(), counter);
    let mut update = MockAlgebra.new_accumulator(&sk).unwrap();
    let mut accumulator = MockAlgebra
        .verify_signed(&update.signed_accumulator, &pk)
        .unwrap();
    for i in 1..events {
        let attr = RevocationAttribute::from_bytes(vec![i as u8]);
        let parent = update.events.last().unwrap().clone();
        let (advanced, event) = MockAlgebra.remove(&accumulator, &sk, &attr, &parent).unwrap();
        update.events.push(event);
        accumulator = advanced;
    }
    update.signed_accumulator = MockAlgebra.sign(&accumulator, &sk).unwrap();
    (update.signed_accumulator, update.events)
}

fn issuance_record(key: &str, issued: i64) -> IssuanceRecord {
    IssuanceRecord {
        key: key.into(),
        cred_type: cred_type(),
        issued,
        pk_counter: 1,
        attr: RevocationAttribute::from_bytes(vec![0x05]),
        valid_until: 1 << 62,
        revoked_at: 0,
    }
}

pub fn execute_all_store_tests(store: &RevocationStore) {
    test_accumulator_lifecycle(store);
    test_event_log(store);
    test_issuance_records(store);
    test_failed_transaction_rolls_back(store);
}

fn test_accumulator_lifecycle(store: &RevocationStore) {
    let id = cred_type();
    let (signed, _) = stream(1, 1);

    let exists = store
        .with_transaction(|access| access.accumulator_exists(&id, 1))
        .unwrap();
    assert!(!exists);

    assert_ok!(store.with_transaction(|access| {
        access.insert_accumulator(&AccumulatorRecord::new(&id, &signed))
    }));
    assert!(store
        .with_transaction(|access| access.accumulator_exists(&id, 1))
        .unwrap());

    // Upserting replaces the stream's accumulator in place.
    let (replacement, _) = stream(1, 2);
    assert_ok!(store.with_transaction(|access| {
        access.save_accumulator(&AccumulatorRecord::new(&id, &replacement))
    }));
    let records = store
        .with_transaction(|access| access.last_accumulators(&id, None))
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].signed_accumulator(), replacement);

    let by_counter = store
        .with_transaction(|access| access.last_accumulators(&id, Some(1)))
        .unwrap();
    assert_eq!(by_counter.len(), 1);
    assert!(store
        .with_transaction(|access| access.last_accumulators(&id, Some(9)))
        .unwrap()
        .is_empty());
}

fn test_event_log(store: &RevocationStore) {
    let id = cred_type();
    let (signed, events) = stream(2, 20);
    let records: Vec<EventRecord> = events
        .iter()
        .map(|event| EventRecord::new(&id, 2, event.clone()))
        .collect();

    assert_ok!(store.with_transaction(|access| {
        access.save_accumulator(&AccumulatorRecord::new(&id, &signed))?;
        access.insert_events(&records)
    }));

    let range = store
        .with_transaction(|access| access.events(&id, 2, 4, 9))
        .unwrap();
    assert_eq!(range.len(), 5);
    assert_eq!(range[0].event.index, 4);
    assert_eq!(range[4].event.index, 8);

    let latest = store
        .with_transaction(|access| access.latest_events(&id, Some(2), 6))
        .unwrap();
    assert_eq!(latest.len(), 6);
    assert_eq!(latest[0].event.index, 14);
    assert_eq!(latest[5].event.index, 19);

    let last = assert_some!(store
        .with_transaction(|access| access.last_event(&id, 2))
        .unwrap());
    assert_eq!(last.event.index, 19);

    // Re-inserting an existing range must leave the log unchanged.
    assert_ok!(store.with_transaction(|access| access.insert_events(&records[..8])));
    let full = store
        .with_transaction(|access| access.events(&id, 2, 0, 32))
        .unwrap();
    assert_eq!(full.len(), 20);
}

fn test_issuance_records(store: &RevocationStore) {
    let id = cred_type();
    assert_ok!(
        store.with_transaction(|access| access.insert_issuance_record(&issuance_record("alice", 10)))
    );
    assert_ok!(
        store.with_transaction(|access| access.insert_issuance_record(&issuance_record("alice", 20)))
    );
    assert_ok!(
        store.with_transaction(|access| access.insert_issuance_record(&issuance_record("bob", 10)))
    );

    let all_alice = store
        .with_transaction(|access| access.issuance_records(&id, "alice", None))
        .unwrap();
    assert_eq!(all_alice.len(), 2);
    let narrowed = store
        .with_transaction(|access| access.issuance_records(&id, "alice", Some(20)))
        .unwrap();
    assert_eq!(narrowed.len(), 1);

    // Marking a record revoked removes it from the non-revoked view.
    let mut revoked = issuance_record("alice", 10);
    revoked.revoked_at = 999;
    assert_ok!(store.with_transaction(|access| access.save_issuance_record(&revoked)));
    let remaining = store
        .with_transaction(|access| access.issuance_records(&id, "alice", None))
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].issued, 20);

    // Expiry GC: everything in this suite has valid_until = 1 << 62.
    let deleted = store
        .with_transaction(|access| access.delete_expired_issuance_records(i64::MAX))
        .unwrap();
    assert_eq!(deleted, 3);
    assert!(store
        .with_transaction(|access| access.issuance_records(&id, "bob", None))
        .unwrap()
        .is_empty());
}

fn test_failed_transaction_rolls_back(store: &RevocationStore) {
    let id = cred_type();
    let (signed, _) = stream(7, 1);
    let result: Result<(), _> = store.with_transaction(|access| {
        access.insert_accumulator(&AccumulatorRecord::new(&id, &signed))?;
        Err(revocation_types::RevocationError::Storage(
            "injected failure".into(),
        ))
    });
    assert!(result.is_err());
    assert!(!store
        .with_transaction(|access| access.accumulator_exists(&id, 7))
        .unwrap());
}
