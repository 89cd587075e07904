//! Attendance records for members and ad-hoc visitors.
//!
//! # Invariants
//! - A member record always references a registered child.
//! - A visitor record never references a child and carries its own
//!   name and birth date captured at registration time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::child::ChildId;
use super::service::ServiceId;

pub type AttendanceId = Uuid;

/// Display name used when a member record has no resolvable child.
pub const UNKNOWN_CHILD_NAME: &str = "Desconhecido";

/// Inline identity of a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorDetails {
    pub name: String,
    pub birth_date: NaiveDate,
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
}

/// Who attended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Attendee {
    Member { child_id: ChildId },
    Visitor(VisitorDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub service_id: ServiceId,
    pub classroom: String,
    pub attendee: Attendee,
}

impl AttendanceRecord {
    pub fn member(service_id: ServiceId, classroom: impl Into<String>, child_id: ChildId) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            classroom: classroom.into(),
            attendee: Attendee::Member { child_id },
        }
    }

    pub fn visitor(
        service_id: ServiceId,
        classroom: impl Into<String>,
        details: VisitorDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            classroom: classroom.into(),
            attendee: Attendee::Visitor(details),
        }
    }

    pub fn is_visitor(&self) -> bool {
        matches!(self.attendee, Attendee::Visitor(_))
    }

    pub fn child_id(&self) -> Option<ChildId> {
        match &self.attendee {
            Attendee::Member { child_id } => Some(*child_id),
            Attendee::Visitor(_) => None,
        }
    }
}

/// Attendance record as read back for reporting, with the linked child's
/// name when the link resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub record: AttendanceRecord,
    pub child_name: Option<String>,
}

/// Attendance record enriched with service identity and a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    pub record: AttendanceRecord,
    pub service_date: NaiveDate,
    pub time_slot: String,
    pub display_name: String,
}

impl AttendanceEntry {
    pub fn classroom(&self) -> &str {
        &self.record.classroom
    }

    pub fn is_visitor(&self) -> bool {
        self.record.is_visitor()
    }
}

/// Visitor name, else linked child name, else `UNKNOWN_CHILD_NAME`.
pub fn display_name(record: &AttendanceRecord, child_name: Option<&str>) -> String {
    match &record.attendee {
        Attendee::Visitor(details) => details.name.clone(),
        Attendee::Member { .. } => child_name.unwrap_or(UNKNOWN_CHILD_NAME).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_visitor_then_child_then_placeholder() {
        let service_id = Uuid::new_v4();
        let visitor = AttendanceRecord::visitor(
            service_id,
            "jardim",
            VisitorDetails {
                name: "Ana".to_string(),
                birth_date: NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date"),
                guardian_name: None,
                phone: None,
            },
        );
        let member = AttendanceRecord::member(service_id, "jardim", Uuid::new_v4());

        assert_eq!(display_name(&visitor, Some("ignored")), "Ana");
        assert_eq!(display_name(&member, Some("Bia")), "Bia");
        assert_eq!(display_name(&member, None), UNKNOWN_CHILD_NAME);
    }

    #[test]
    fn visitor_flag_follows_attendee_variant() {
        let member = AttendanceRecord::member(Uuid::new_v4(), "maternal", Uuid::new_v4());
        assert!(!member.is_visitor());
        assert!(member.child_id().is_some());
    }
}
