// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::records::{AccumulatorRecord, EventRecord};
use diesel::{
    prelude::*,
    r2d2::{ConnectionManager, Pool},
};
use revocation_types::{
    crypto::KeyCounter, CredentialTypeIdentifier, Event, EventHash, IssuanceRecord,
    RevocationAttribute, RevocationError,
};

pub mod schema {
    diesel::table! {
        accumulator_records (cred_type, pk_counter) {
            cred_type -> Text,
            pk_counter -> Integer,
            data -> Binary,
        }
    }

    diesel::table! {
        event_records (cred_type, pk_counter, event_index) {
            cred_type -> Text,
            pk_counter -> Integer,
            event_index -> BigInt,
            e -> Binary,
            parent_hash -> Binary,
        }
    }

    diesel::table! {
        issuance_records (revocation_key, cred_type, issued) {
            revocation_key -> Text,
            cred_type -> Text,
            issued -> BigInt,
            pk_counter -> Integer,
            attr -> Binary,
            valid_until -> BigInt,
            revoked_at -> BigInt,
        }
    }
}

use schema::{accumulator_records, event_records, issuance_records};

/// The SQL backends supported for server and proxy modes. The dialect
/// decides the connection variant and the column type used for big
/// integers, hashes and signed blobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    Mysql,
}

impl SqlDialect {
    pub fn from_connection_string(connection_string: &str) -> Result<Self, RevocationError> {
        if connection_string.starts_with("postgres://")
            || connection_string.starts_with("postgresql://")
        {
            Ok(Self::Postgres)
        } else if connection_string.starts_with("mysql://") {
            Ok(Self::Mysql)
        } else {
            Err(RevocationError::InvalidConfiguration(
                "unsupported revocation database dialect (supported: postgres, mysql)".into(),
            ))
        }
    }

    /// The column type for byte-string columns.
    fn binary_column_type(self) -> &'static str {
        match self {
            Self::Postgres => "bytea",
            Self::Mysql => "blob",
        }
    }
}

#[derive(diesel::MultiConnection)]
pub enum AnyConnection {
    Postgresql(diesel::PgConnection),
    Mysql(diesel::MysqlConnection),
}

/// Durable store backing server and proxy modes.
#[derive(Clone)]
pub struct SqlStore {
    pool: Pool<ConnectionManager<AnyConnection>>,
    dialect: SqlDialect,
}

/// Lets domain errors ride through a diesel transaction (which requires its
/// error type to absorb diesel rollback errors).
enum TxError {
    Db(diesel::result::Error),
    Domain(RevocationError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

fn db_error(error: diesel::result::Error) -> RevocationError {
    match error {
        diesel::result::Error::NotFound => RevocationError::StateNotFound,
        other => RevocationError::Storage(other.to_string()),
    }
}

impl SqlStore {
    pub fn open(connection_string: &str) -> Result<Self, RevocationError> {
        let dialect = SqlDialect::from_connection_string(connection_string)?;
        let manager = ConnectionManager::<AnyConnection>::new(connection_string);
        let pool = Pool::builder()
            .build(manager)
            .map_err(|error| RevocationError::Storage(error.to_string()))?;
        Ok(Self { pool, dialect })
    }

    /// Creates the revocation tables if they do not exist yet.
    pub fn ensure_schema(&self) -> Result<(), RevocationError> {
        let binary = self.dialect.binary_column_type();
        let statements = [
            format!(
                "CREATE TABLE IF NOT EXISTS accumulator_records (\
                 cred_type VARCHAR(255) NOT NULL, \
                 pk_counter INTEGER NOT NULL, \
                 data {binary} NOT NULL, \
                 PRIMARY KEY (cred_type, pk_counter))"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS event_records (\
                 cred_type VARCHAR(255) NOT NULL, \
                 pk_counter INTEGER NOT NULL, \
                 event_index BIGINT NOT NULL, \
                 e {binary} NOT NULL, \
                 parent_hash {binary} NOT NULL, \
                 PRIMARY KEY (cred_type, pk_counter, event_index))"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS issuance_records (\
                 revocation_key VARCHAR(255) NOT NULL, \
                 cred_type VARCHAR(255) NOT NULL, \
                 issued BIGINT NOT NULL, \
                 pk_counter INTEGER NOT NULL, \
                 attr {binary} NOT NULL, \
                 valid_until BIGINT NOT NULL, \
                 revoked_at BIGINT NOT NULL, \
                 PRIMARY KEY (revocation_key, cred_type, issued))"
            ),
        ];
        let mut conn = self
            .pool
            .get()
            .map_err(|error| RevocationError::Storage(error.to_string()))?;
        for statement in statements {
            diesel::sql_query(statement)
                .execute(&mut *conn)
                .map_err(db_error)?;
        }
        Ok(())
    }

    pub(crate) fn with_transaction<T, F>(&self, f: F) -> Result<T, RevocationError>
    where
        F: FnOnce(&mut crate::StoreAccess<'_>) -> Result<T, RevocationError>,
    {
        let mut conn = self
            .pool
            .get()
            .map_err(|error| RevocationError::Storage(error.to_string()))?;
        conn.transaction::<T, TxError, _>(|conn| {
            f(&mut crate::StoreAccess::sql(conn)).map_err(TxError::Domain)
        })
        .map_err(|error| match error {
            TxError::Domain(error) => error,
            TxError::Db(error) => db_error(error),
        })
    }
}

// Structs corresponding to SQL table rows.

#[derive(Queryable, Insertable)]
#[diesel(table_name = accumulator_records)]
struct AccumulatorRow {
    cred_type: String,
    pk_counter: i32,
    data: Vec<u8>,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = event_records)]
struct EventRow {
    cred_type: String,
    pk_counter: i32,
    event_index: i64,
    e: Vec<u8>,
    parent_hash: Vec<u8>,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = issuance_records)]
struct IssuanceRow {
    revocation_key: String,
    cred_type: String,
    issued: i64,
    pk_counter: i32,
    attr: Vec<u8>,
    valid_until: i64,
    revoked_at: i64,
}

fn parse_cred_type(raw: &str) -> Result<CredentialTypeIdentifier, RevocationError> {
    raw.parse().map_err(|_| {
        RevocationError::Storage(format!("corrupt credential type identifier in database: {raw:?}"))
    })
}

impl AccumulatorRow {
    fn from_record(record: &AccumulatorRecord) -> Self {
        Self {
            cred_type: record.cred_type.as_str().to_string(),
            pk_counter: record.pk_counter as i32,
            data: record.data.to_vec(),
        }
    }

    fn into_record(self) -> Result<AccumulatorRecord, RevocationError> {
        Ok(AccumulatorRecord {
            cred_type: parse_cred_type(&self.cred_type)?,
            pk_counter: self.pk_counter as KeyCounter,
            data: self.data.into(),
        })
    }
}

impl EventRow {
    fn from_record(record: &EventRecord) -> Self {
        Self {
            cred_type: record.cred_type.as_str().to_string(),
            pk_counter: record.pk_counter as i32,
            event_index: record.event.index as i64,
            e: record.event.e.to_vec(),
            parent_hash: record.event.parent_hash.as_bytes().to_vec(),
        }
    }

    fn into_record(self) -> Result<EventRecord, RevocationError> {
        let parent_hash = EventHash::from_slice(&self.parent_hash)
            .map_err(|_| RevocationError::Storage("corrupt event hash in database".into()))?;
        Ok(EventRecord {
            cred_type: parse_cred_type(&self.cred_type)?,
            pk_counter: self.pk_counter as KeyCounter,
            event: Event {
                index: self.event_index as u64,
                e: RevocationAttribute::from(self.e),
                parent_hash,
            },
        })
    }
}

impl IssuanceRow {
    fn from_record(record: &IssuanceRecord) -> Self {
        Self {
            revocation_key: record.key.clone(),
            cred_type: record.cred_type.as_str().to_string(),
            issued: record.issued,
            pk_counter: record.pk_counter as i32,
            attr: record.attr.to_vec(),
            valid_until: record.valid_until,
            revoked_at: record.revoked_at,
        }
    }

    fn into_record(self) -> Result<IssuanceRecord, RevocationError> {
        Ok(IssuanceRecord {
            key: self.revocation_key,
            cred_type: parse_cred_type(&self.cred_type)?,
            issued: self.issued,
            pk_counter: self.pk_counter as KeyCounter,
            attr: RevocationAttribute::from(self.attr),
            valid_until: self.valid_until,
            revoked_at: self.revoked_at,
        })
    }
}

pub(crate) fn accumulator_exists(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    counter: KeyCounter,
) -> Result<bool, RevocationError> {
    let count: i64 = accumulator_records::table
        .filter(accumulator_records::cred_type.eq(id.as_str()))
        .filter(accumulator_records::pk_counter.eq(counter as i32))
        .count()
        .get_result(conn)
        .map_err(db_error)?;
    Ok(count > 0)
}

pub(crate) fn last_accumulators(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    counter: Option<KeyCounter>,
) -> Result<Vec<AccumulatorRecord>, RevocationError> {
    let rows: Vec<AccumulatorRow> = match counter {
        Some(counter) => accumulator_records::table
            .filter(accumulator_records::cred_type.eq(id.as_str()))
            .filter(accumulator_records::pk_counter.eq(counter as i32))
            .load(conn),
        None => accumulator_records::table
            .filter(accumulator_records::cred_type.eq(id.as_str()))
            .order(accumulator_records::pk_counter.asc())
            .load(conn),
    }
    .map_err(db_error)?;
    rows.into_iter().map(AccumulatorRow::into_record).collect()
}

pub(crate) fn events(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    counter: KeyCounter,
    from: u64,
    to: u64,
) -> Result<Vec<EventRecord>, RevocationError> {
    let rows: Vec<EventRow> = event_records::table
        .filter(event_records::cred_type.eq(id.as_str()))
        .filter(event_records::pk_counter.eq(counter as i32))
        .filter(event_records::event_index.ge(from as i64))
        .filter(event_records::event_index.lt(to as i64))
        .order(event_records::event_index.asc())
        .load(conn)
        .map_err(db_error)?;
    rows.into_iter().map(EventRow::into_record).collect()
}

pub(crate) fn latest_events(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    counter: Option<KeyCounter>,
    count: u64,
) -> Result<Vec<EventRecord>, RevocationError> {
    let counters: Vec<i32> = match counter {
        Some(counter) => vec![counter as i32],
        None => accumulator_records::table
            .filter(accumulator_records::cred_type.eq(id.as_str()))
            .select(accumulator_records::pk_counter)
            .load(conn)
            .map_err(db_error)?,
    };
    let mut records = Vec::new();
    for stream_counter in counters {
        let mut rows: Vec<EventRow> = event_records::table
            .filter(event_records::cred_type.eq(id.as_str()))
            .filter(event_records::pk_counter.eq(stream_counter))
            .order(event_records::event_index.desc())
            .limit(count as i64)
            .load(conn)
            .map_err(db_error)?;
        rows.reverse();
        for row in rows {
            records.push(row.into_record()?);
        }
    }
    Ok(records)
}

pub(crate) fn last_event(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    counter: KeyCounter,
) -> Result<Option<EventRecord>, RevocationError> {
    let row: Option<EventRow> = event_records::table
        .filter(event_records::cred_type.eq(id.as_str()))
        .filter(event_records::pk_counter.eq(counter as i32))
        .order(event_records::event_index.desc())
        .first(conn)
        .optional()
        .map_err(db_error)?;
    row.map(EventRow::into_record).transpose()
}

pub(crate) fn insert_accumulator(
    conn: &mut AnyConnection,
    record: &AccumulatorRecord,
) -> Result<(), RevocationError> {
    if accumulator_exists(conn, &record.cred_type, record.pk_counter)? {
        return Ok(());
    }
    diesel::insert_into(accumulator_records::table)
        .values(AccumulatorRow::from_record(record))
        .execute(conn)
        .map_err(db_error)?;
    Ok(())
}

pub(crate) fn save_accumulator(
    conn: &mut AnyConnection,
    record: &AccumulatorRecord,
) -> Result<(), RevocationError> {
    let updated = diesel::update(
        accumulator_records::table
            .filter(accumulator_records::cred_type.eq(record.cred_type.as_str()))
            .filter(accumulator_records::pk_counter.eq(record.pk_counter as i32)),
    )
    .set(accumulator_records::data.eq(record.data.to_vec()))
    .execute(conn)
    .map_err(db_error)?;
    if updated == 0 {
        diesel::insert_into(accumulator_records::table)
            .values(AccumulatorRow::from_record(record))
            .execute(conn)
            .map_err(db_error)?;
    }
    Ok(())
}

pub(crate) fn insert_events(
    conn: &mut AnyConnection,
    records: &[EventRecord],
) -> Result<(), RevocationError> {
    for record in records {
        // The primary key on (cred_type, pk_counter, event_index) keeps the
        // log append-only; an event that is already present is skipped, not
        // rewritten.
        let present: i64 = event_records::table
            .filter(event_records::cred_type.eq(record.cred_type.as_str()))
            .filter(event_records::pk_counter.eq(record.pk_counter as i32))
            .filter(event_records::event_index.eq(record.event.index as i64))
            .count()
            .get_result(conn)
            .map_err(db_error)?;
        if present > 0 {
            continue;
        }
        diesel::insert_into(event_records::table)
            .values(EventRow::from_record(record))
            .execute(conn)
            .map_err(db_error)?;
    }
    Ok(())
}

pub(crate) fn insert_issuance_record(
    conn: &mut AnyConnection,
    record: &IssuanceRecord,
) -> Result<(), RevocationError> {
    let present: i64 = issuance_records::table
        .filter(issuance_records::revocation_key.eq(&record.key))
        .filter(issuance_records::cred_type.eq(record.cred_type.as_str()))
        .filter(issuance_records::issued.eq(record.issued))
        .count()
        .get_result(conn)
        .map_err(db_error)?;
    if present > 0 {
        return Ok(());
    }
    diesel::insert_into(issuance_records::table)
        .values(IssuanceRow::from_record(record))
        .execute(conn)
        .map_err(db_error)?;
    Ok(())
}

pub(crate) fn save_issuance_record(
    conn: &mut AnyConnection,
    record: &IssuanceRecord,
) -> Result<(), RevocationError> {
    let updated = diesel::update(
        issuance_records::table
            .filter(issuance_records::revocation_key.eq(&record.key))
            .filter(issuance_records::cred_type.eq(record.cred_type.as_str()))
            .filter(issuance_records::issued.eq(record.issued)),
    )
    .set((
        issuance_records::pk_counter.eq(record.pk_counter as i32),
        issuance_records::attr.eq(record.attr.to_vec()),
        issuance_records::valid_until.eq(record.valid_until),
        issuance_records::revoked_at.eq(record.revoked_at),
    ))
    .execute(conn)
    .map_err(db_error)?;
    if updated == 0 {
        diesel::insert_into(issuance_records::table)
            .values(IssuanceRow::from_record(record))
            .execute(conn)
            .map_err(db_error)?;
    }
    Ok(())
}

pub(crate) fn issuance_records(
    conn: &mut AnyConnection,
    id: &CredentialTypeIdentifier,
    key: &str,
    issued: Option<i64>,
) -> Result<Vec<IssuanceRecord>, RevocationError> {
    let rows: Vec<IssuanceRow> = match issued {
        Some(issued) => issuance_records::table
            .filter(issuance_records::cred_type.eq(id.as_str()))
            .filter(issuance_records::revocation_key.eq(key))
            .filter(issuance_records::revoked_at.eq(0i64))
            .filter(issuance_records::issued.eq(issued))
            .load(conn),
        None => issuance_records::table
            .filter(issuance_records::cred_type.eq(id.as_str()))
            .filter(issuance_records::revocation_key.eq(key))
            .filter(issuance_records::revoked_at.eq(0i64))
            .load(conn),
    }
    .map_err(db_error)?;
    rows.into_iter().map(IssuanceRow::into_record).collect()
}

pub(crate) fn delete_expired_issuance_records(
    conn: &mut AnyConnection,
    cutoff_ns: i64,
) -> Result<usize, RevocationError> {
    diesel::delete(issuance_records::table.filter(issuance_records::valid_until.lt(cutoff_ns)))
        .execute(conn)
        .map_err(db_error)
}
