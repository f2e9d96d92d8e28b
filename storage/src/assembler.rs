// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::records::{AccumulatorRecord, EventRecord};
use revocation_types::{crypto::KeyCounter, Update};
use std::collections::BTreeMap;

/// Merges raw store rows into one coherent update per key counter: each
/// accumulator record seeds an update, matching events are attached and
/// sorted by index. Events without a seeded accumulator are dropped. No
/// cryptography happens here; the authority verifies assembled updates when
/// it ingests them.
pub fn assemble_updates(
    accumulators: &[AccumulatorRecord],
    events: &[EventRecord],
) -> BTreeMap<KeyCounter, Update> {
    let mut updates: BTreeMap<KeyCounter, Update> = accumulators
        .iter()
        .map(|record| {
            (
                record.pk_counter,
                Update::new(record.signed_accumulator(), Vec::new()),
            )
        })
        .collect();
    for record in events {
        if let Some(update) = updates.get_mut(&record.pk_counter) {
            update.events.push(record.event.clone());
        }
    }
    for update in updates.values_mut() {
        update.events.sort_by_key(|event| event.index);
    }
    updates
}
