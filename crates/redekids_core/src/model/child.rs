//! Child roster model.
//!
//! # Invariants
//! - `id` is stable and never reused for another child.
//! - `active == false` is the soft-delete state; rows are never removed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ChildId = Uuid;

/// Registered child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub guardian_name: String,
    /// One of `RELATIONSHIPS` in practice; stored as free text.
    pub guardian_relationship: String,
    pub phone: String,
    pub active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for child registration and full edits.
///
/// All fields are required; blank strings are rejected by the service layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewChild {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub guardian_name: String,
    pub guardian_relationship: String,
    pub phone: String,
}

/// Validated child fields ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFields {
    pub name: String,
    pub birth_date: NaiveDate,
    pub guardian_name: String,
    pub guardian_relationship: String,
    pub phone: String,
}
