//! Servant and service assignment repository.
//!
//! # Responsibility
//! - Provide CRUD APIs over `servants`.
//! - Persist and list `service_servants` assignments.
//!
//! # Invariants
//! - Servants are deactivated, never deleted.
//! - Assignments carry no uniqueness constraint.

use crate::model::servant::{AssignmentId, NewServant, Servant, ServantAssignment, ServantId};
use crate::model::service::{ServiceId, ServiceOccurrence};
use crate::repo::service_repo::{
    create_service_in, find_service_in, list_services_between_in, ServiceRepository,
};
use crate::repo::{bool_to_int, ensure_tables, parse_flag, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SERVANT_SELECT_SQL: &str = "SELECT id, name, phone, active, created_at FROM servants";

/// Query options for listing servants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServantListQuery {
    pub include_inactive: bool,
}

/// Assignment row joined with the servant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRow {
    pub assignment: ServantAssignment,
    pub servant_name: String,
}

/// Repository interface for servants and their schedule.
pub trait ServantRepository {
    /// `servant.name` must already be trimmed and non-blank.
    fn create_servant(&self, servant: &NewServant) -> RepoResult<ServantId>;
    fn update_servant(&self, id: ServantId, servant: &NewServant) -> RepoResult<()>;
    fn get_servant(&self, id: ServantId) -> RepoResult<Option<Servant>>;
    fn list_servants(&self, query: &ServantListQuery) -> RepoResult<Vec<Servant>>;
    fn deactivate_servant(&self, id: ServantId) -> RepoResult<()>;
    fn count_active_servants(&self) -> RepoResult<u64>;
    fn create_assignment(&self, assignment: &ServantAssignment) -> RepoResult<AssignmentId>;
    /// Deletes by id. Returns whether a row was removed.
    fn delete_assignment(&self, id: AssignmentId) -> RepoResult<bool>;
    fn list_assignments(&self, service_id: ServiceId) -> RepoResult<Vec<AssignmentRow>>;
}

/// SQLite-backed servant repository.
pub struct SqliteServantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteServantRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["servants", "services", "service_servants"])?;
        Ok(Self { conn })
    }
}

impl ServiceRepository for SqliteServantRepository<'_> {
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

impl ServantRepository for SqliteServantRepository<'_> {
    fn create_servant(&self, servant: &NewServant) -> RepoResult<ServantId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO servants (id, name, phone, active) VALUES (?1, ?2, ?3, 1);",
            params![
                id.to_string(),
                servant.name.as_str(),
                servant.phone.as_deref()
            ],
        )?;
        Ok(id)
    }

    fn update_servant(&self, id: ServantId, servant: &NewServant) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE servants SET name = ?2, phone = ?3 WHERE id = ?1;",
            params![
                id.to_string(),
                servant.name.as_str(),
                servant.phone.as_deref()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_servant(&self, id: ServantId) -> RepoResult<Option<Servant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SERVANT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_servant_row(row)?));
        }
        Ok(None)
    }

    fn list_servants(&self, query: &ServantListQuery) -> RepoResult<Vec<Servant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SERVANT_SELECT_SQL}
             WHERE (?1 = 1 OR active = 1)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(query.include_inactive)])?;
        let mut servants = Vec::new();
        while let Some(row) = rows.next()? {
            servants.push(parse_servant_row(row)?);
        }
        Ok(servants)
    }

    fn deactivate_servant(&self, id: ServantId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE servants SET active = 0 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_active_servants(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM servants WHERE active = 1;",
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn create_assignment(&self, assignment: &ServantAssignment) -> RepoResult<AssignmentId> {
        self.conn.execute(
            "INSERT INTO service_servants (id, service_id, servant_id, role, classroom)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                assignment.id.to_string(),
                assignment.service_id.to_string(),
                assignment.servant_id.to_string(),
                assignment.role.as_str(),
                assignment.classroom.as_str(),
            ],
        )?;
        Ok(assignment.id)
    }

    fn delete_assignment(&self, id: AssignmentId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM service_servants WHERE id = ?1;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_assignments(&self, service_id: ServiceId) -> RepoResult<Vec<AssignmentRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                ss.id,
                ss.service_id,
                ss.servant_id,
                ss.role,
                ss.classroom,
                s.name AS servant_name
             FROM service_servants ss
             INNER JOIN servants s ON s.id = ss.servant_id
             WHERE ss.service_id = ?1
             ORDER BY ss.classroom ASC, s.name COLLATE NOCASE ASC, ss.rowid ASC;",
        )?;
        let mut rows = stmt.query([service_id.to_string()])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let service_text: String = row.get("service_id")?;
            let servant_text: String = row.get("servant_id")?;
            assignments.push(AssignmentRow {
                assignment: ServantAssignment {
                    id: parse_uuid(&id_text, "service_servants.id")?,
                    service_id: parse_uuid(&service_text, "service_servants.service_id")?,
                    servant_id: parse_uuid(&servant_text, "service_servants.servant_id")?,
                    role: row.get("role")?,
                    classroom: row.get("classroom")?,
                },
                servant_name: row.get("servant_name")?,
            });
        }
        Ok(assignments)
    }
}

fn parse_servant_row(row: &Row<'_>) -> RepoResult<Servant> {
    let id_text: String = row.get("id")?;
    Ok(Servant {
        id: parse_uuid(&id_text, "servants.id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
        active: parse_flag(row.get("active")?, "servants.active")?,
        created_at: row.get("created_at")?,
    })
}
