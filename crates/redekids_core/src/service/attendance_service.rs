//! Attendance registration and monthly report use-cases.
//!
//! # Responsibility
//! - Register member attendance in batches with duplicate suppression.
//! - Register ad-hoc visitors into the classroom matching their age.
//! - Read attendance back per service/classroom and per calendar month.
//!
//! # Invariants
//! - Inputs are validated before any store call.
//! - Only children not yet recorded for `(service, classroom)` are inserted,
//!   and the remaining batch is written atomically.
//! - The duplicate check and the insert are separate steps; concurrent
//!   registrations of the same child can both pass the check.
//! - Removing an attendance id that does not exist succeeds.

use crate::model::attendance::{
    display_name, AttendanceEntry, AttendanceId, AttendanceRecord, VisitorDetails,
};
use crate::model::child::ChildId;
use crate::model::classroom::{age_in_years, classroom_for_age};
use crate::model::service::ServiceId;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::service_repo::ServiceRepository;
use crate::repo::RepoError;
use crate::service::service_resolver::{find_service_id, resolve_service};
use chrono::{Datelike, Months, NaiveDate};
use log::{debug, error, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for attendance use-cases.
#[derive(Debug)]
pub enum AttendanceError {
    /// Required input missing or blank. Raised before any store call.
    Validation {
        field: &'static str,
        message: &'static str,
    },
    /// Store read/write failed while performing `operation`.
    Persistence {
        operation: &'static str,
        source: RepoError,
    },
    /// Every requested child is already registered for the service/classroom.
    Duplicate,
    /// Visitor age falls outside every classroom bucket.
    AgeRange { age: i32 },
}

impl AttendanceError {
    /// Short pt-BR message safe to show to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation { message, .. } => *message,
            Self::Persistence { operation, .. } => match *operation {
                "resolve_service" => {
                    "Erro ao criar culto. Verifique os logs do servidor para mais detalhes."
                }
                "register_attendance" => "Erro ao registrar presença",
                "register_visitor" => "Erro ao registrar visitante",
                "remove_attendance" => "Erro ao remover presença",
                _ => "Erro ao buscar presenças",
            },
            Self::Duplicate => "Todas as crianças já foram registradas neste culto",
            Self::AgeRange { .. } => "Idade fora da faixa do departamento infantil",
        }
    }

    fn persistence(operation: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| {
            error!(
                "event={operation} module=attendance status=error error_code={} error={source}",
                source.code()
            );
            Self::Persistence { operation, source }
        }
    }
}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, .. } => write!(f, "missing or blank field `{field}`"),
            Self::Persistence { operation, source } => {
                write!(f, "{operation} failed [{}]: {source}", source.code())
            }
            Self::Duplicate => write!(f, "all children already registered for this service"),
            Self::AgeRange { age } => write!(f, "age {age} is outside every classroom range"),
        }
    }
}

impl Error for AttendanceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Batch registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAttendanceRequest {
    pub service_date: NaiveDate,
    pub time_slot: String,
    pub classroom: String,
    /// Treated as a set; repeated ids count once.
    pub child_ids: Vec<ChildId>,
}

/// Visitor registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterVisitorRequest {
    pub service_date: Option<NaiveDate>,
    pub time_slot: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
}

/// Attendance service facade over repository implementations.
pub struct AttendanceService<R: AttendanceRepository + ServiceRepository> {
    repo: R,
}

impl<R: AttendanceRepository + ServiceRepository> AttendanceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Get-or-create the occurrence for `(service_date, time_slot)`.
    pub fn resolve_service(
        &self,
        service_date: NaiveDate,
        time_slot: &str,
    ) -> Result<ServiceId, AttendanceError> {
        let time_slot = required(time_slot, "time_slot", "Selecione o turno do culto")?;
        resolve_service(&self.repo, service_date, time_slot)
            .map_err(AttendanceError::persistence("resolve_service"))
    }

    /// Registers member attendance and returns how many rows were inserted.
    ///
    /// Children already recorded for the same service and classroom are
    /// skipped. When nothing is left to insert, returns `Duplicate`.
    pub fn register_attendance(
        &self,
        request: &RegisterAttendanceRequest,
    ) -> Result<usize, AttendanceError> {
        const MESSAGE: &str = "Selecione pelo menos uma criança";
        let time_slot = required(&request.time_slot, "time_slot", MESSAGE)?;
        let classroom = required(&request.classroom, "classroom", MESSAGE)?;
        if request.child_ids.is_empty() {
            warn!("event=register_attendance module=attendance status=rejected reason=no_children");
            return Err(AttendanceError::Validation {
                field: "child_ids",
                message: MESSAGE,
            });
        }

        let requested: BTreeSet<ChildId> = request.child_ids.iter().copied().collect();
        let requested: Vec<ChildId> = requested.into_iter().collect();

        let service_id = resolve_service(&self.repo, request.service_date, time_slot)
            .map_err(AttendanceError::persistence("resolve_service"))?;

        let already = self
            .repo
            .registered_child_ids(service_id, classroom, Some(requested.as_slice()))
            .map_err(AttendanceError::persistence("register_attendance"))?;

        let records: Vec<AttendanceRecord> = requested
            .iter()
            .filter(|child_id| !already.contains(*child_id))
            .map(|child_id| AttendanceRecord::member(service_id, classroom, *child_id))
            .collect();

        if records.is_empty() {
            info!(
                "event=register_attendance module=attendance status=rejected reason=duplicate service_id={service_id} classroom={classroom} requested={}",
                requested.len()
            );
            return Err(AttendanceError::Duplicate);
        }

        let inserted = self
            .repo
            .insert_attendance_batch(&records)
            .map_err(AttendanceError::persistence("register_attendance"))?;

        info!(
            "event=register_attendance module=attendance status=ok service_id={service_id} classroom={classroom} requested={} skipped={} inserted={inserted}",
            requested.len(),
            already.len()
        );
        Ok(inserted)
    }

    /// Registers one visitor into the classroom matching their age on `today`.
    pub fn register_visitor(
        &self,
        request: &RegisterVisitorRequest,
        today: NaiveDate,
    ) -> Result<AttendanceRecord, AttendanceError> {
        const MESSAGE: &str = "Nome e data de nascimento são obrigatórios";
        let Some(service_date) = request.service_date else {
            return Err(rejected_visitor("service_date", MESSAGE));
        };
        let time_slot = required(&request.time_slot, "time_slot", MESSAGE)?;
        let name = required(&request.name, "name", MESSAGE)?;
        let Some(birth_date) = request.birth_date else {
            return Err(rejected_visitor("birth_date", MESSAGE));
        };

        let age = age_in_years(birth_date, today);
        let Some(classroom) = classroom_for_age(age) else {
            warn!("event=register_visitor module=attendance status=rejected reason=age_out_of_range age={age}");
            return Err(AttendanceError::AgeRange { age });
        };

        let service_id = resolve_service(&self.repo, service_date, time_slot)
            .map_err(AttendanceError::persistence("resolve_service"))?;

        let record = AttendanceRecord::visitor(
            service_id,
            classroom.id,
            VisitorDetails {
                name: name.to_string(),
                birth_date,
                guardian_name: optional(request.guardian_name.as_deref()),
                phone: optional(request.phone.as_deref()),
            },
        );
        self.repo
            .insert_attendance(&record)
            .map_err(AttendanceError::persistence("register_visitor"))?;

        info!(
            "event=register_visitor module=attendance status=ok service_id={service_id} classroom={} attendance_id={}",
            classroom.id, record.id
        );
        Ok(record)
    }

    /// Deletes one attendance row. A missing id is not an error.
    pub fn remove_attendance(&self, id: AttendanceId) -> Result<(), AttendanceError> {
        let removed = self
            .repo
            .delete_attendance(id)
            .map_err(AttendanceError::persistence("remove_attendance"))?;
        if removed {
            info!("event=remove_attendance module=attendance status=ok attendance_id={id}");
        } else {
            debug!(
                "event=remove_attendance module=attendance status=ok outcome=absent attendance_id={id}"
            );
        }
        Ok(())
    }

    /// Member child ids recorded for an existing service and classroom.
    ///
    /// Never creates a service; an unknown `(date, time_slot)` yields an
    /// empty set. Slot and classroom are trimmed the same way registration
    /// trims them.
    pub fn list_registered_child_ids(
        &self,
        service_date: NaiveDate,
        time_slot: &str,
        classroom: &str,
    ) -> Result<BTreeSet<ChildId>, AttendanceError> {
        const MESSAGE: &str = "Selecione o culto e a sala";
        let time_slot = required(time_slot, "time_slot", MESSAGE)?;
        let classroom = required(classroom, "classroom", MESSAGE)?;
        let Some(service_id) = find_service_id(&self.repo, service_date, time_slot)
            .map_err(AttendanceError::persistence("list_registered_child_ids"))?
        else {
            return Ok(BTreeSet::new());
        };

        self.repo
            .registered_child_ids(service_id, classroom, None)
            .map_err(AttendanceError::persistence("list_registered_child_ids"))
    }

    /// Attendance for services dated in `[year-month-01, next-month-01)`,
    /// enriched with service date, time slot and display name.
    ///
    /// Returns an empty list without reading attendance when the month has
    /// no services. Grouping is left to the report layer.
    pub fn attendance_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendanceEntry>, AttendanceError> {
        let Some((start, end)) = month_window(year, month) else {
            warn!("event=attendance_for_month module=attendance status=rejected year={year} month={month}");
            return Err(AttendanceError::Validation {
                field: "month",
                message: "Mês inválido",
            });
        };

        let services = self
            .repo
            .list_services_between(start, end)
            .map_err(AttendanceError::persistence("attendance_for_month"))?;
        if services.is_empty() {
            debug!("event=attendance_for_month module=attendance status=ok services=0 start={start}");
            return Ok(Vec::new());
        }

        let service_ids: Vec<ServiceId> = services.iter().map(|service| service.id).collect();
        let by_id: HashMap<ServiceId, _> = services
            .iter()
            .map(|service| (service.id, service))
            .collect();

        let rows = self
            .repo
            .list_attendance_for_services(&service_ids)
            .map_err(AttendanceError::persistence("attendance_for_month"))?;

        let entries: Vec<AttendanceEntry> = rows
            .into_iter()
            .filter_map(|row| {
                let service = by_id.get(&row.record.service_id)?;
                let name = display_name(&row.record, row.child_name.as_deref());
                Some(AttendanceEntry {
                    service_date: service.service_date,
                    time_slot: service.time_slot.clone(),
                    display_name: name,
                    record: row.record,
                })
            })
            .collect();

        info!(
            "event=attendance_for_month module=attendance status=ok start={start} services={} records={}",
            services.len(),
            entries.len()
        );
        Ok(entries)
    }
}

/// Half-open window `[first day of month, first day of next month)`.
///
/// Returns `None` for an invalid month.
pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((start, end))
}

/// First and last-exclusive day of the month containing `day`.
pub fn month_window_of(day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    month_window(day.year(), day.month())
}

fn required<'a>(
    value: &'a str,
    field: &'static str,
    message: &'static str,
) -> Result<&'a str, AttendanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!("event=attendance_validation module=attendance status=rejected field={field}");
        return Err(AttendanceError::Validation { field, message });
    }
    Ok(trimmed)
}

fn rejected_visitor(field: &'static str, message: &'static str) -> AttendanceError {
    warn!("event=register_visitor module=attendance status=rejected field={field}");
    AttendanceError::Validation { field, message }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
