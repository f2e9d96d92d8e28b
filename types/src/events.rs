// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{attribute::RevocationAttribute, error::RevocationError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

pub const EVENT_HASH_LEN: usize = 32;

/// SHA-256 digest of an event's canonical CBOR encoding. Each event carries
/// the hash of its predecessor, making the event log an append-only hash
/// chain.
#[derive(Clone, Copy, Default, Hash, PartialEq, Eq)]
pub struct EventHash(pub [u8; EVENT_HASH_LEN]);

impl EventHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, RevocationError> {
        let hash: [u8; EVENT_HASH_LEN] = bytes.try_into().map_err(|_| {
            RevocationError::InvalidUpdate(format!("event hash must be {EVENT_HASH_LEN} bytes"))
        })?;
        Ok(Self(hash))
    }
}

impl fmt::Debug for EventHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHash({})", hex::encode(self.0))
    }
}

impl Serialize for EventHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for EventHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HashVisitor;

        impl<'de> de::Visitor<'de> for HashVisitor {
            type Value = EventHash;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a {EVENT_HASH_LEN}-byte hash")
            }

            fn visit_bytes<E: de::Error>(self, bytes: &[u8]) -> Result<Self::Value, E> {
                EventHash::from_slice(bytes).map_err(E::custom)
            }

            fn visit_byte_buf<E: de::Error>(self, bytes: Vec<u8>) -> Result<Self::Value, E> {
                self.visit_bytes(&bytes)
            }
        }

        deserializer.deserialize_bytes(HashVisitor)
    }
}

/// One atomic change to the accumulator, almost always a revocation. Event 0
/// is the genesis event created when revocation is enabled; its parent hash
/// is all zeroes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub index: u64,
    pub e: RevocationAttribute,
    pub parent_hash: EventHash,
}

impl Event {
    pub fn hash(&self) -> Result<EventHash, RevocationError> {
        let mut encoded = Vec::new();
        ciborium::into_writer(self, &mut encoded).map_err(|error| {
            RevocationError::InvalidUpdate(format!("cannot hash event: {error}"))
        })?;
        let digest: [u8; EVENT_HASH_LEN] = Sha256::digest(&encoded).into();
        Ok(EventHash(digest))
    }
}

/// Requires the events to be consecutive by index and chained by parent
/// hash, and the genesis event (if present) to chain from the zero hash.
pub fn validate_chain(events: &[Event]) -> Result<(), RevocationError> {
    if let Some(first) = events.first() {
        if first.index == 0 && first.parent_hash != EventHash::default() {
            return Err(RevocationError::InvalidUpdate(
                "genesis event must have a zero parent hash".into(),
            ));
        }
    }
    for pair in events.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.index != previous.index + 1 {
            return Err(RevocationError::InvalidUpdate(format!(
                "event index {} does not follow {}",
                next.index, previous.index
            )));
        }
        if next.parent_hash != previous.hash()? {
            return Err(RevocationError::InvalidUpdate(format!(
                "event {} does not chain to its parent",
                next.index
            )));
        }
    }
    Ok(())
}

/// A run of consecutive events, as served by the range endpoints.
/// `compute_product` is a decode hint for the accumulator algebra (it asks
/// for the product of the attributes to be accumulated during decoding) and
/// is not interpreted here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
    #[serde(default)]
    pub compute_product: bool,
}

impl EventList {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            compute_product: false,
        }
    }

    /// Concatenates range responses into one list, requiring the ranges to
    /// abut and chain. The inputs must be ordered by index.
    pub fn flatten(lists: Vec<EventList>) -> Result<EventList, RevocationError> {
        let compute_product = lists.iter().all(|list| list.compute_product);
        let events: Vec<Event> = lists.into_iter().flat_map(|list| list.events).collect();
        validate_chain(&events)?;
        Ok(EventList {
            events,
            compute_product,
        })
    }
}
