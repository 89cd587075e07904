//! Child repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `children` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Rows are never deleted; deactivation flips `active` to 0.
//! - Active listings are ordered by name.

use crate::model::child::{Child, ChildFields, ChildId};
use crate::repo::{bool_to_int, ensure_tables, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const CHILD_SELECT_SQL: &str = "SELECT
    id,
    name,
    birth_date,
    guardian_name,
    guardian_relationship,
    phone,
    active,
    created_at
FROM children";

/// Query options for listing children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildListQuery {
    pub include_inactive: bool,
}

/// Repository interface for child roster operations.
pub trait ChildRepository {
    fn create_child(&self, fields: &ChildFields) -> RepoResult<ChildId>;
    fn update_child(&self, id: ChildId, fields: &ChildFields) -> RepoResult<()>;
    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>>;
    fn list_children(&self, query: &ChildListQuery) -> RepoResult<Vec<Child>>;
    fn deactivate_child(&self, id: ChildId) -> RepoResult<()>;
    fn count_active_children(&self) -> RepoResult<u64>;
    /// Most recently registered active children, newest first.
    fn list_recent_children(&self, limit: u32) -> RepoResult<Vec<Child>>;
}

/// SQLite-backed child repository.
pub struct SqliteChildRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChildRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["children"])?;
        Ok(Self { conn })
    }
}

impl ChildRepository for SqliteChildRepository<'_> {
    fn create_child(&self, fields: &ChildFields) -> RepoResult<ChildId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO children (
                id,
                name,
                birth_date,
                guardian_name,
                guardian_relationship,
                phone,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1);",
            params![
                id.to_string(),
                fields.name.as_str(),
                fields.birth_date,
                fields.guardian_name.as_str(),
                fields.guardian_relationship.as_str(),
                fields.phone.as_str(),
            ],
        )?;
        Ok(id)
    }

    fn update_child(&self, id: ChildId, fields: &ChildFields) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE children
             SET
                name = ?2,
                birth_date = ?3,
                guardian_name = ?4,
                guardian_relationship = ?5,
                phone = ?6
             WHERE id = ?1;",
            params![
                id.to_string(),
                fields.name.as_str(),
                fields.birth_date,
                fields.guardian_name.as_str(),
                fields.guardian_relationship.as_str(),
                fields.phone.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHILD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_child_row(row)?));
        }
        Ok(None)
    }

    fn list_children(&self, query: &ChildListQuery) -> RepoResult<Vec<Child>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHILD_SELECT_SQL}
             WHERE (?1 = 1 OR active = 1)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(query.include_inactive)])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_child_row(row)?);
        }
        Ok(children)
    }

    fn deactivate_child(&self, id: ChildId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE children SET active = 0 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_active_children(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM children WHERE active = 1;",
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn list_recent_children(&self, limit: u32) -> RepoResult<Vec<Child>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHILD_SELECT_SQL}
             WHERE active = 1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_child_row(row)?);
        }
        Ok(children)
    }
}

fn parse_child_row(row: &Row<'_>) -> RepoResult<Child> {
    let id_text: String = row.get("id")?;
    Ok(Child {
        id: parse_uuid(&id_text, "children.id")?,
        name: row.get("name")?,
        birth_date: row.get("birth_date")?,
        guardian_name: row.get("guardian_name")?,
        guardian_relationship: row.get("guardian_relationship")?,
        phone: row.get("phone")?,
        active: parse_flag(row.get("active")?, "children.active")?,
        created_at: row.get("created_at")?,
    })
}
