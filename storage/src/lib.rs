// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Record stores for the revocation subsystem. Two interchangeable
//! backends expose the same operations: a durable SQL store (PostgreSQL or
//! MySQL, required for server and proxy modes) and an in-memory store used
//! in requestor mode. All access goes through [`RevocationStore::with_transaction`],
//! which provides a consistent snapshot and commits atomically on both
//! backends.

mod assembler;
mod memory;
mod records;
mod sql;

#[cfg(test)]
mod tests;

pub use assembler::assemble_updates;
pub use memory::MemoryStore;
pub use records::{AccumulatorRecord, EventRecord};
pub use sql::{AnyConnection, SqlDialect, SqlStore};

use revocation_types::{
    crypto::KeyCounter, CredentialTypeIdentifier, IssuanceRecord, RevocationError,
};

/// A revocation record store, either SQL-backed or in-memory.
#[derive(Clone)]
pub enum RevocationStore {
    Sql(SqlStore),
    Memory(MemoryStore),
}

impl RevocationStore {
    /// Opens the store for the given connection string; an empty string
    /// selects the in-memory backend.
    pub fn open(connection_string: &str) -> Result<Self, RevocationError> {
        if connection_string.is_empty() {
            return Ok(Self::Memory(MemoryStore::new()));
        }
        Ok(Self::Sql(SqlStore::open(connection_string)?))
    }

    pub fn sql_backed(&self) -> bool {
        matches!(self, Self::Sql(_))
    }

    /// Runs `f` against a consistent snapshot of the store and commits its
    /// writes atomically: a SQL transaction, or a copy-on-write swap of the
    /// in-memory state. Any error rolls everything back.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T, RevocationError>
    where
        F: FnOnce(&mut StoreAccess<'_>) -> Result<T, RevocationError>,
    {
        match self {
            Self::Sql(store) => store.with_transaction(f),
            Self::Memory(store) => store.with_transaction(f),
        }
    }

    /// Releases the backing connection pool, if any.
    pub fn close(self) {}
}

/// The store operations, bound to one transaction. Obtained through
/// [`RevocationStore::with_transaction`].
pub struct StoreAccess<'a> {
    inner: AccessInner<'a>,
}

enum AccessInner<'a> {
    Sql(&'a mut AnyConnection),
    Memory(&'a mut memory::MemoryState),
}

impl<'a> StoreAccess<'a> {
    pub(crate) fn sql(conn: &'a mut AnyConnection) -> Self {
        Self {
            inner: AccessInner::Sql(conn),
        }
    }

    pub(crate) fn memory(state: &'a mut memory::MemoryState) -> Self {
        Self {
            inner: AccessInner::Memory(state),
        }
    }
}

impl StoreAccess<'_> {
    pub fn accumulator_exists(
        &mut self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Result<bool, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::accumulator_exists(conn, id, counter),
            AccessInner::Memory(state) => Ok(state.accumulator_exists(id, counter)),
        }
    }

    /// The latest accumulator record of every matching stream, one per key
    /// counter.
    pub fn last_accumulators(
        &mut self,
        id: &CredentialTypeIdentifier,
        counter: Option<KeyCounter>,
    ) -> Result<Vec<AccumulatorRecord>, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::last_accumulators(conn, id, counter),
            AccessInner::Memory(state) => Ok(state.last_accumulators(id, counter)),
        }
    }

    /// The events of one stream in `[from, to)`, ordered by index. Interval
    /// alignment is the caller's concern.
    pub fn events(
        &mut self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        from: u64,
        to: u64,
    ) -> Result<Vec<EventRecord>, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::events(conn, id, counter, from, to),
            AccessInner::Memory(state) => Ok(state.events(id, counter, from, to)),
        }
    }

    /// The `count` highest-index events per matching stream, ordered by
    /// index within each stream.
    pub fn latest_events(
        &mut self,
        id: &CredentialTypeIdentifier,
        counter: Option<KeyCounter>,
        count: u64,
    ) -> Result<Vec<EventRecord>, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::latest_events(conn, id, counter, count),
            AccessInner::Memory(state) => Ok(state.latest_events(id, counter, count)),
        }
    }

    pub fn last_event(
        &mut self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Result<Option<EventRecord>, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::last_event(conn, id, counter),
            AccessInner::Memory(state) => Ok(state.last_event(id, counter)),
        }
    }

    /// Inserts the accumulator record unless its stream already has one.
    pub fn insert_accumulator(
        &mut self,
        record: &AccumulatorRecord,
    ) -> Result<(), RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::insert_accumulator(conn, record),
            AccessInner::Memory(state) => state.insert_accumulator(record),
        }
    }

    /// Upserts the accumulator record, replacing the stream's current one.
    pub fn save_accumulator(&mut self, record: &AccumulatorRecord) -> Result<(), RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::save_accumulator(conn, record),
            AccessInner::Memory(state) => state.save_accumulator(record),
        }
    }

    /// Appends events to their streams; events already present are left
    /// untouched (the log is append-only).
    pub fn insert_events(&mut self, records: &[EventRecord]) -> Result<(), RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::insert_events(conn, records),
            AccessInner::Memory(state) => state.insert_events(records),
        }
    }

    pub fn insert_issuance_record(
        &mut self,
        record: &IssuanceRecord,
    ) -> Result<(), RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::insert_issuance_record(conn, record),
            AccessInner::Memory(state) => state.insert_issuance_record(record),
        }
    }

    pub fn save_issuance_record(&mut self, record: &IssuanceRecord) -> Result<(), RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::save_issuance_record(conn, record),
            AccessInner::Memory(state) => state.save_issuance_record(record),
        }
    }

    /// The non-revoked issuance records for (id, key), optionally narrowed
    /// to one issuance time.
    pub fn issuance_records(
        &mut self,
        id: &CredentialTypeIdentifier,
        key: &str,
        issued: Option<i64>,
    ) -> Result<Vec<IssuanceRecord>, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::issuance_records(conn, id, key, issued),
            AccessInner::Memory(state) => Ok(state.issuance_records(id, key, issued)),
        }
    }

    /// Deletes issuance records of credentials that expired before
    /// `cutoff_ns`, returning how many were removed.
    pub fn delete_expired_issuance_records(
        &mut self,
        cutoff_ns: i64,
    ) -> Result<usize, RevocationError> {
        match &mut self.inner {
            AccessInner::Sql(conn) => sql::delete_expired_issuance_records(conn, cutoff_ns),
            AccessInner::Memory(state) => Ok(state.delete_expired_issuance_records(cutoff_ns)),
        }
    }
}
