// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    attribute::RevocationAttribute,
    events::{Event, EventHash},
};
use claims::assert_ok;

#[test]
fn test_attribute_byte_representation_is_identity() {
    // The SQL layer stores attributes as their raw bytes; storing and
    // loading must not change the value.
    let attr = RevocationAttribute::from_bytes(vec![0x05, 0xff, 0x00, 0x7b]);
    let stored = attr.to_vec();
    assert_eq!(RevocationAttribute::from(stored), attr);
}

#[test]
fn test_event_hash_byte_representation_is_identity() {
    let hash = EventHash([0xab; 32]);
    let restored = assert_ok!(EventHash::from_slice(hash.as_bytes()));
    assert_eq!(restored, hash);
}

#[test]
fn test_event_cbor_roundtrip() {
    let event = Event {
        index: 17,
        e: RevocationAttribute::from_bytes(vec![1, 2, 3]),
        parent_hash: EventHash([9; 32]),
    };
    let mut encoded = Vec::new();
    assert_ok!(ciborium::into_writer(&event, &mut encoded));
    let decoded: Event = assert_ok!(ciborium::from_reader(&encoded[..]));
    assert_eq!(decoded, event);
}
