//! Service occurrence model (one gathering on a date and time slot).
//!
//! # Invariants
//! - At most one occurrence per `(service_date, time_slot)` is intended.
//!   It is maintained by lookup-before-insert only, so concurrent creators
//!   can still produce duplicates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ServiceId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOccurrence {
    pub id: ServiceId,
    pub service_date: NaiveDate,
    /// Free-form label such as `morning`, `evening` or a custom name.
    pub time_slot: String,
}
