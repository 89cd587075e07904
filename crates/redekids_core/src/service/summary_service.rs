//! Home screen summary.

use crate::model::child::Child;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::child_repo::ChildRepository;
use crate::repo::servant_repo::ServantRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::attendance_service::month_window_of;
use chrono::{Days, NaiveDate};
use serde::Serialize;

const RECENT_CHILDREN_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeSummary {
    pub active_children: u64,
    pub active_servants: u64,
    /// Records whose service date falls in the month containing `today`.
    pub attendance_this_month: u64,
    /// Records whose service date is `today`.
    pub attendance_today: u64,
    /// Newest active registrations first.
    pub recent_children: Vec<Child>,
}

/// Collects roster and attendance counts for the month containing `today`.
pub fn home_summary<C, S, A>(
    children: &C,
    servants: &S,
    attendance: &A,
    today: NaiveDate,
) -> RepoResult<HomeSummary>
where
    C: ChildRepository + ?Sized,
    S: ServantRepository + ?Sized,
    A: AttendanceRepository + ?Sized,
{
    let (month_start, month_end) = month_window_of(today)
        .ok_or_else(|| RepoError::InvalidData(format!("no month window for {today}")))?;
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| RepoError::InvalidData(format!("no day after {today}")))?;

    Ok(HomeSummary {
        active_children: children.count_active_children()?,
        active_servants: servants.count_active_servants()?,
        attendance_this_month: attendance.count_attendance_between(month_start, month_end)?,
        attendance_today: attendance.count_attendance_between(today, tomorrow)?,
        recent_children: children.list_recent_children(RECENT_CHILDREN_LIMIT)?,
    })
}
