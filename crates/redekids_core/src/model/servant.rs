//! Volunteer servant model and per-service assignments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service::ServiceId;

pub type ServantId = Uuid;
pub type AssignmentId = Uuid;

/// Registered volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servant {
    pub id: ServantId,
    pub name: String,
    pub phone: Option<String>,
    pub active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for servant registration and edits. Only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewServant {
    pub name: String,
    pub phone: Option<String>,
}

/// A servant scheduled to one service occurrence.
///
/// Duplicates of the same (service, servant, role, classroom) are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServantAssignment {
    pub id: AssignmentId,
    pub service_id: ServiceId,
    pub servant_id: ServantId,
    /// Free form: `professor`, `auxiliar` or anything else.
    pub role: String,
    pub classroom: String,
}

/// Assignment joined with servant and service identity for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentEntry {
    pub assignment: ServantAssignment,
    pub servant_name: String,
    pub service_date: NaiveDate,
    pub time_slot: String,
}
