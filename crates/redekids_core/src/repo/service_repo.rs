//! Service occurrence repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up, create and range-scan `services` rows.
//!
//! # Invariants
//! - `(service_date, time_slot)` is not a unique key in storage. When
//!   duplicates exist, lookups return the earliest created row so repeated
//!   lookups stay stable.

use crate::model::service::{ServiceId, ServiceOccurrence};
use crate::repo::{ensure_tables, parse_uuid, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

/// Repository interface for service occurrences.
pub trait ServiceRepository {
    /// Exact `(date, time_slot)` match, earliest created first.
    fn find_service(
        &self,
        service_date: NaiveDate,
        time_slot: &str,
    ) -> RepoResult<Option<ServiceOccurrence>>;
    fn create_service(&self, service: &ServiceOccurrence) -> RepoResult<ServiceId>;
    /// Services with `start <= service_date < end`, ordered by date.
    fn list_services_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<ServiceOccurrence>>;
}

/// SQLite-backed service occurrence repository.
pub struct SqliteServiceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteServiceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["services"])?;
        Ok(Self { conn })
    }
}

impl ServiceRepository for SqliteServiceRepository<'_> {
    fn find_service(
        &self,
        service_date: NaiveDate,
        time_slot: &str,
    ) -> RepoResult<Option<ServiceOccurrence>> {
        find_service_in(self.conn, service_date, time_slot)
    }

    fn create_service(&self, service: &ServiceOccurrence) -> RepoResult<ServiceId> {
        create_service_in(self.conn, service)
    }

    fn list_services_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<ServiceOccurrence>> {
        list_services_between_in(self.conn, start, end)
    }
}

pub(crate) fn find_service_in(
    conn: &Connection,
    service_date: NaiveDate,
    time_slot: &str,
) -> RepoResult<Option<ServiceOccurrence>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_date, time_slot
         FROM services
         WHERE service_date = ?1
           AND time_slot = ?2
         ORDER BY created_at ASC, rowid ASC
         LIMIT 1;",
    )?;
    let mut rows = stmt.query(params![service_date, time_slot])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_service_row(row)?));
    }
    Ok(None)
}

pub(crate) fn create_service_in(
    conn: &Connection,
    service: &ServiceOccurrence,
) -> RepoResult<ServiceId> {
    conn.execute(
        "INSERT INTO services (id, service_date, time_slot) VALUES (?1, ?2, ?3);",
        params![
            service.id.to_string(),
            service.service_date,
            service.time_slot.as_str()
        ],
    )?;
    Ok(service.id)
}

pub(crate) fn list_services_between_in(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<ServiceOccurrence>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_date, time_slot
         FROM services
         WHERE service_date >= ?1
           AND service_date < ?2
         ORDER BY service_date ASC, created_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query(params![start, end])?;
    let mut services = Vec::new();
    while let Some(row) = rows.next()? {
        services.push(parse_service_row(row)?);
    }
    Ok(services)
}

fn parse_service_row(row: &Row<'_>) -> RepoResult<ServiceOccurrence> {
    let id_text: String = row.get("id")?;
    Ok(ServiceOccurrence {
        id: parse_uuid(&id_text, "services.id")?,
        service_date: row.get("service_date")?,
        time_slot: row.get("time_slot")?,
    })
}
