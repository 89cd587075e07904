//! Servant roster and scheduling use-case service.
//!
//! # Responsibility
//! - Validate and persist servant registrations and edits.
//! - Schedule servants to service occurrences by role and classroom.
//!
//! # Invariants
//! - Only `name` is required for a servant; blank phones are stored as none.
//! - Scheduling resolves the service with get-or-create semantics.
//! - The same servant may be scheduled repeatedly for the same slot.

use crate::model::servant::{
    AssignmentEntry, AssignmentId, NewServant, Servant, ServantAssignment, ServantId,
};
use crate::repo::servant_repo::{ServantListQuery, ServantRepository};
use crate::repo::service_repo::ServiceRepository;
use crate::service::child_service::RosterError;
use crate::service::service_resolver::resolve_service;
use chrono::NaiveDate;
use log::{debug, info};
use uuid::Uuid;

/// Scheduling input; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignServantRequest {
    pub service_date: Option<NaiveDate>,
    pub time_slot: String,
    pub servant_id: Option<ServantId>,
    pub role: String,
    pub classroom: String,
}

/// Servant service facade over repository implementations.
pub struct ServantService<R: ServantRepository + ServiceRepository> {
    repo: R,
}

impl<R: ServantRepository + ServiceRepository> ServantService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_servant(&self, input: &NewServant) -> Result<Servant, RosterError> {
        let servant = validate_servant(input, "create_servant")?;
        let id = self
            .repo
            .create_servant(&servant)
            .map_err(RosterError::from_repo("create_servant"))?;
        info!("event=create_servant module=roster status=ok servant_id={id}");
        self.read_back(id, "create_servant")
    }

    pub fn update_servant(
        &self,
        id: ServantId,
        input: &NewServant,
    ) -> Result<Servant, RosterError> {
        let servant = validate_servant(input, "update_servant")?;
        self.repo
            .update_servant(id, &servant)
            .map_err(RosterError::from_repo("update_servant"))?;
        info!("event=update_servant module=roster status=ok servant_id={id}");
        self.read_back(id, "update_servant")
    }

    /// Soft-deletes a servant (`active = false`).
    pub fn deactivate_servant(&self, id: ServantId) -> Result<(), RosterError> {
        self.repo
            .deactivate_servant(id)
            .map_err(RosterError::from_repo("deactivate_servant"))?;
        info!("event=deactivate_servant module=roster status=ok servant_id={id}");
        Ok(())
    }

    pub fn get_servant(&self, id: ServantId) -> Result<Option<Servant>, RosterError> {
        self.repo
            .get_servant(id)
            .map_err(RosterError::from_repo("get_servant"))
    }

    /// Active servants ordered by name.
    pub fn list_active_servants(&self) -> Result<Vec<Servant>, RosterError> {
        self.repo
            .list_servants(&ServantListQuery::default())
            .map_err(RosterError::from_repo("list_servants"))
    }

    /// Schedules a servant, creating the service occurrence when needed.
    pub fn assign_servant(
        &self,
        request: &AssignServantRequest,
    ) -> Result<ServantAssignment, RosterError> {
        const OPERATION: &str = "assign_servant";
        const MESSAGE: &str = "Todos os campos são obrigatórios";
        let Some(service_date) = request.service_date else {
            return Err(RosterError::validation(OPERATION, "service_date", MESSAGE));
        };
        let Some(servant_id) = request.servant_id else {
            return Err(RosterError::validation(OPERATION, "servant_id", MESSAGE));
        };
        let time_slot = required(&request.time_slot, "time_slot")?;
        let role = required(&request.role, "role")?;
        let classroom = required(&request.classroom, "classroom")?;

        let service_id = resolve_service(&self.repo, service_date, time_slot)
            .map_err(RosterError::from_repo("resolve_service"))?;

        let assignment = ServantAssignment {
            id: Uuid::new_v4(),
            service_id,
            servant_id,
            role: role.to_string(),
            classroom: classroom.to_string(),
        };
        self.repo
            .create_assignment(&assignment)
            .map_err(RosterError::from_repo(OPERATION))?;

        info!(
            "event=assign_servant module=roster status=ok assignment_id={} service_id={service_id} servant_id={servant_id} role={role} classroom={classroom}",
            assignment.id
        );
        Ok(assignment)
    }

    /// Deletes one assignment. A missing id is not an error.
    pub fn remove_assignment(&self, id: AssignmentId) -> Result<(), RosterError> {
        let removed = self
            .repo
            .delete_assignment(id)
            .map_err(RosterError::from_repo("remove_assignment"))?;
        debug!("event=remove_assignment module=roster status=ok assignment_id={id} removed={removed}");
        Ok(())
    }

    /// Assignments for an existing service; empty when the service is unknown.
    pub fn list_assignments(
        &self,
        service_date: NaiveDate,
        time_slot: &str,
    ) -> Result<Vec<AssignmentEntry>, RosterError> {
        let time_slot = time_slot.trim();
        if time_slot.is_empty() {
            return Err(RosterError::validation(
                "list_assignments",
                "time_slot",
                "Selecione o turno do culto",
            ));
        }
        let Some(service) = self
            .repo
            .find_service(service_date, time_slot)
            .map_err(RosterError::from_repo("list_assignments"))?
        else {
            return Ok(Vec::new());
        };

        let rows = self
            .repo
            .list_assignments(service.id)
            .map_err(RosterError::from_repo("list_assignments"))?;
        Ok(rows
            .into_iter()
            .map(|row| AssignmentEntry {
                assignment: row.assignment,
                servant_name: row.servant_name,
                service_date: service.service_date,
                time_slot: service.time_slot.clone(),
            })
            .collect())
    }

    fn read_back(&self, id: ServantId, operation: &'static str) -> Result<Servant, RosterError> {
        self.repo
            .get_servant(id)
            .map_err(RosterError::from_repo(operation))?
            .ok_or(RosterError::NotFound(id))
    }
}

fn validate_servant(input: &NewServant, operation: &'static str) -> Result<NewServant, RosterError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(RosterError::validation(
            operation,
            "name",
            "Nome é obrigatório",
        ));
    }
    Ok(NewServant {
        name: name.to_string(),
        phone: input
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string),
    })
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RosterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterError::validation(
            "assign_servant",
            field,
            "Todos os campos são obrigatórios",
        ));
    }
    Ok(trimmed)
}
