// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::records::{AccumulatorRecord, EventRecord};
use parking_lot::Mutex;
use revocation_types::{
    crypto::KeyCounter, CredentialTypeIdentifier, IssuanceRecord, RevocationError,
    SignedAccumulator,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

/// Non-durable store used in requestor mode. Commits are atomic: a
/// transaction mutates a clone of the state under the lock and swaps it in
/// only on success, so readers always observe a committed snapshot and a
/// failed transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryState {
    streams: HashMap<CredentialTypeIdentifier, BTreeMap<KeyCounter, MemoryStream>>,
    issuance: BTreeMap<(String, CredentialTypeIdentifier, i64), IssuanceRecord>,
}

#[derive(Clone)]
struct MemoryStream {
    accumulator: SignedAccumulator,
    /// Sorted by index, append-only.
    events: Vec<EventRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_transaction<T, F>(&self, f: F) -> Result<T, RevocationError>
    where
        F: FnOnce(&mut crate::StoreAccess<'_>) -> Result<T, RevocationError>,
    {
        let mut state = self.state.lock();
        let mut snapshot = state.clone();
        let result = f(&mut crate::StoreAccess::memory(&mut snapshot))?;
        *state = snapshot;
        Ok(result)
    }
}

impl MemoryState {
    fn stream(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Option<&MemoryStream> {
        self.streams.get(id).and_then(|streams| streams.get(&counter))
    }

    pub(crate) fn accumulator_exists(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> bool {
        self.stream(id, counter).is_some()
    }

    pub(crate) fn last_accumulators(
        &self,
        id: &CredentialTypeIdentifier,
        counter: Option<KeyCounter>,
    ) -> Vec<AccumulatorRecord> {
        let Some(streams) = self.streams.get(id) else {
            return Vec::new();
        };
        streams
            .iter()
            .filter(|(stream_counter, _)| counter.is_none() || counter == Some(**stream_counter))
            .map(|(stream_counter, stream)| AccumulatorRecord {
                cred_type: id.clone(),
                pk_counter: *stream_counter,
                data: stream.accumulator.data.clone(),
            })
            .collect()
    }

    pub(crate) fn events(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        from: u64,
        to: u64,
    ) -> Vec<EventRecord> {
        self.stream(id, counter)
            .map(|stream| {
                stream
                    .events
                    .iter()
                    .filter(|record| record.event.index >= from && record.event.index < to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn latest_events(
        &self,
        id: &CredentialTypeIdentifier,
        counter: Option<KeyCounter>,
        count: u64,
    ) -> Vec<EventRecord> {
        let Some(streams) = self.streams.get(id) else {
            return Vec::new();
        };
        let mut records = Vec::new();
        for (stream_counter, stream) in streams {
            if counter.is_some() && counter != Some(*stream_counter) {
                continue;
            }
            let skip = stream.events.len().saturating_sub(count as usize);
            records.extend(stream.events[skip..].iter().cloned());
        }
        records
    }

    pub(crate) fn last_event(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Option<EventRecord> {
        self.stream(id, counter)
            .and_then(|stream| stream.events.last().cloned())
    }

    pub(crate) fn insert_accumulator(
        &mut self,
        record: &AccumulatorRecord,
    ) -> Result<(), RevocationError> {
        let streams = self.streams.entry(record.cred_type.clone()).or_default();
        streams.entry(record.pk_counter).or_insert(MemoryStream {
            accumulator: record.signed_accumulator(),
            events: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn save_accumulator(
        &mut self,
        record: &AccumulatorRecord,
    ) -> Result<(), RevocationError> {
        let streams = self.streams.entry(record.cred_type.clone()).or_default();
        match streams.get_mut(&record.pk_counter) {
            Some(stream) => stream.accumulator = record.signed_accumulator(),
            None => {
                streams.insert(record.pk_counter, MemoryStream {
                    accumulator: record.signed_accumulator(),
                    events: Vec::new(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn insert_events(
        &mut self,
        records: &[EventRecord],
    ) -> Result<(), RevocationError> {
        for record in records {
            let stream = self
                .streams
                .get_mut(&record.cred_type)
                .and_then(|streams| streams.get_mut(&record.pk_counter))
                .ok_or(RevocationError::StateNotFound)?;
            match stream
                .events
                .binary_search_by_key(&record.event.index, |existing| existing.event.index)
            {
                // Already present; the log is append-only and events are
                // immutable, so this is a no-op.
                Ok(_) => {}
                Err(position) => stream.events.insert(position, record.clone()),
            }
        }
        Ok(())
    }

    pub(crate) fn insert_issuance_record(
        &mut self,
        record: &IssuanceRecord,
    ) -> Result<(), RevocationError> {
        self.issuance
            .entry((record.key.clone(), record.cred_type.clone(), record.issued))
            .or_insert_with(|| record.clone());
        Ok(())
    }

    pub(crate) fn save_issuance_record(
        &mut self,
        record: &IssuanceRecord,
    ) -> Result<(), RevocationError> {
        self.issuance.insert(
            (record.key.clone(), record.cred_type.clone(), record.issued),
            record.clone(),
        );
        Ok(())
    }

    pub(crate) fn issuance_records(
        &self,
        id: &CredentialTypeIdentifier,
        key: &str,
        issued: Option<i64>,
    ) -> Vec<IssuanceRecord> {
        self.issuance
            .values()
            .filter(|record| {
                record.cred_type == *id
                    && record.key == key
                    && !record.is_revoked()
                    && issued.map_or(true, |issued| record.issued == issued)
            })
            .cloned()
            .collect()
    }

    pub(crate) fn delete_expired_issuance_records(&mut self, cutoff_ns: i64) -> usize {
        let before = self.issuance.len();
        self.issuance
            .retain(|_, record| record.valid_until >= cutoff_ns);
        before - self.issuance.len()
    }
}
