//! Get-or-create resolution of service occurrences.
//!
//! # Invariants
//! - Sequential calls with the same `(date, time_slot)` return the same id.
//! - Lookup and insert are separate statements without locking. Two callers
//!   racing on a missing occurrence can both insert; later lookups then
//!   settle on the earliest row.

use crate::model::service::{ServiceId, ServiceOccurrence};
use crate::repo::service_repo::ServiceRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{debug, error, info};
use uuid::Uuid;

/// Returns the id of the occurrence for `(service_date, time_slot)`,
/// creating it when none exists.
pub fn resolve_service<R: ServiceRepository + ?Sized>(
    repo: &R,
    service_date: NaiveDate,
    time_slot: &str,
) -> RepoResult<ServiceId> {
    if let Some(existing) = repo.find_service(service_date, time_slot)? {
        debug!(
            "event=service_resolve module=service status=ok outcome=found service_id={}",
            existing.id
        );
        return Ok(existing.id);
    }

    let service = ServiceOccurrence {
        id: Uuid::new_v4(),
        service_date,
        time_slot: time_slot.to_string(),
    };
    match repo.create_service(&service) {
        Ok(id) => {
            info!(
                "event=service_resolve module=service status=ok outcome=created service_id={id} service_date={service_date} time_slot={time_slot}"
            );
            Ok(id)
        }
        Err(err) => {
            error!(
                "event=service_resolve module=service status=error service_date={service_date} time_slot={time_slot} error_code={} error={err}",
                err.code()
            );
            Err(err)
        }
    }
}

/// Exact lookup without creation.
pub fn find_service_id<R: ServiceRepository + ?Sized>(
    repo: &R,
    service_date: NaiveDate,
    time_slot: &str,
) -> RepoResult<Option<ServiceId>> {
    Ok(repo
        .find_service(service_date, time_slot)?
        .map(|service| service.id))
}
