//! Attendance repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist member and visitor attendance rows.
//! - Answer the "already registered" lookup used for duplicate suppression.
//! - Read attendance back for reporting, joined with the child name.
//!
//! # Invariants
//! - Batch inserts are written in one transaction: all rows or none.
//! - `(service_id, classroom, child_id)` is not unique in storage; the
//!   registrar filters duplicates before inserting.

use crate::model::attendance::{
    AttendanceId, AttendanceRecord, AttendanceRow, Attendee, VisitorDetails,
};
use crate::model::child::ChildId;
use crate::model::service::{ServiceId, ServiceOccurrence};
use crate::repo::service_repo::{
    create_service_in, find_service_in, list_services_between_in, ServiceRepository,
};
use crate::repo::{
    bool_to_int, ensure_tables, parse_flag, parse_uuid, placeholders, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

/// Repository interface for attendance rows.
pub trait AttendanceRepository {
    /// Member child ids already recorded for `(service_id, classroom)`.
    ///
    /// When `among` is given, only ids in that slice are considered.
    fn registered_child_ids(
        &self,
        service_id: ServiceId,
        classroom: &str,
        among: Option<&[ChildId]>,
    ) -> RepoResult<BTreeSet<ChildId>>;
    /// Inserts all records in one transaction and returns the row count.
    fn insert_attendance_batch(&self, records: &[AttendanceRecord]) -> RepoResult<usize>;
    fn insert_attendance(&self, record: &AttendanceRecord) -> RepoResult<AttendanceId>;
    /// Deletes by id. Returns whether a row was removed.
    fn delete_attendance(&self, id: AttendanceId) -> RepoResult<bool>;
    /// Records for the given services, ordered by classroom then insertion.
    fn list_attendance_for_services(
        &self,
        service_ids: &[ServiceId],
    ) -> RepoResult<Vec<AttendanceRow>>;
    /// Records whose service date falls in `start <= date < end`.
    fn count_attendance_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<u64>;
}

/// SQLite-backed attendance repository.
///
/// Also serves service occurrence lookups so one handle can drive the whole
/// registration flow.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["services", "attendance", "children"])?;
        Ok(Self { conn })
    }
}

impl ServiceRepository for SqliteAttendanceRepository<'_> {
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

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn registered_child_ids(
        &self,
        service_id: ServiceId,
        classroom: &str,
        among: Option<&[ChildId]>,
    ) -> RepoResult<BTreeSet<ChildId>> {
        let mut sql = String::from(
            "SELECT child_id
             FROM attendance
             WHERE service_id = ?
               AND classroom = ?
               AND is_visitor = 0
               AND child_id IS NOT NULL",
        );
        let mut bind_values = vec![
            Value::Text(service_id.to_string()),
            Value::Text(classroom.to_string()),
        ];

        if let Some(ids) = among {
            if ids.is_empty() {
                return Ok(BTreeSet::new());
            }
            sql.push_str(&format!(" AND child_id IN ({})", placeholders(ids.len())));
            bind_values.extend(ids.iter().map(|id| Value::Text(id.to_string())));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut registered = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            registered.insert(parse_uuid(&value, "attendance.child_id")?);
        }
        Ok(registered)
    }

    fn insert_attendance_batch(&self, records: &[AttendanceRecord]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            insert_record(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> RepoResult<AttendanceId> {
        insert_record(self.conn, record)?;
        Ok(record.id)
    }

    fn delete_attendance(&self, id: AttendanceId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM attendance WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn list_attendance_for_services(
        &self,
        service_ids: &[ServiceId],
    ) -> RepoResult<Vec<AttendanceRow>> {
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT
                a.id,
                a.service_id,
                a.child_id,
                a.classroom,
                a.is_visitor,
                a.visitor_name,
                a.visitor_birth_date,
                a.visitor_guardian_name,
                a.visitor_phone,
                c.name AS child_name
             FROM attendance a
             LEFT JOIN children c ON c.id = a.child_id
             WHERE a.service_id IN ({})
             ORDER BY a.classroom ASC, a.created_at ASC, a.rowid ASC;",
            placeholders(service_ids.len())
        );
        let bind_values = service_ids.iter().map(|id| Value::Text(id.to_string()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(AttendanceRow {
                record: parse_attendance_row(row)?,
                child_name: row.get("child_name")?,
            });
        }
        Ok(records)
    }

    fn count_attendance_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM attendance a
             INNER JOIN services s ON s.id = a.service_id
             WHERE s.service_date >= ?1
               AND s.service_date < ?2;",
            params![start, end],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn insert_record(conn: &Connection, record: &AttendanceRecord) -> RepoResult<()> {
    let (child_id, visitor) = match &record.attendee {
        Attendee::Member { child_id } => (Some(child_id.to_string()), None),
        Attendee::Visitor(details) => (None, Some(details)),
    };

    conn.execute(
        "INSERT INTO attendance (
            id,
            service_id,
            child_id,
            classroom,
            is_visitor,
            visitor_name,
            visitor_birth_date,
            visitor_guardian_name,
            visitor_phone
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            record.id.to_string(),
            record.service_id.to_string(),
            child_id,
            record.classroom.as_str(),
            bool_to_int(record.is_visitor()),
            visitor.map(|v| v.name.as_str()),
            visitor.map(|v| v.birth_date),
            visitor.and_then(|v| v.guardian_name.as_deref()),
            visitor.and_then(|v| v.phone.as_deref()),
        ],
    )?;
    Ok(())
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let id_text: String = row.get("id")?;
    let service_text: String = row.get("service_id")?;
    let is_visitor = parse_flag(row.get("is_visitor")?, "attendance.is_visitor")?;

    let attendee = if is_visitor {
        let name: Option<String> = row.get("visitor_name")?;
        let birth_date: Option<NaiveDate> = row.get("visitor_birth_date")?;
        let (Some(name), Some(birth_date)) = (name, birth_date) else {
            return Err(RepoError::InvalidData(format!(
                "visitor attendance `{id_text}` is missing name or birth date"
            )));
        };
        Attendee::Visitor(VisitorDetails {
            name,
            birth_date,
            guardian_name: row.get("visitor_guardian_name")?,
            phone: row.get("visitor_phone")?,
        })
    } else {
        let child_text: Option<String> = row.get("child_id")?;
        let child_text = child_text.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "member attendance `{id_text}` has no child reference"
            ))
        })?;
        Attendee::Member {
            child_id: parse_uuid(&child_text, "attendance.child_id")?,
        }
    };

    Ok(AttendanceRecord {
        id: parse_uuid(&id_text, "attendance.id")?,
        service_id: parse_uuid(&service_text, "attendance.service_id")?,
        classroom: row.get("classroom")?,
        attendee,
    })
}
