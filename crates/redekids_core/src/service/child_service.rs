//! Child roster use-case service.
//!
//! # Responsibility
//! - Validate and persist child registrations and edits.
//! - Soft-delete children and list the active roster.
//!
//! # Invariants
//! - All child fields are required and trimmed before persistence.
//! - Deactivated children disappear from active listings but keep their
//!   attendance history.

use crate::model::child::{Child, ChildFields, ChildId, NewChild};
use crate::model::classroom::classroom_for_birth_date;
use crate::repo::child_repo::{ChildListQuery, ChildRepository};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for child and servant roster use-cases.
#[derive(Debug)]
pub enum RosterError {
    /// Required input missing or blank.
    Validation {
        field: &'static str,
        message: &'static str,
    },
    /// Target child/servant/assignment does not exist.
    NotFound(Uuid),
    /// Persistence-layer failure.
    Persistence {
        operation: &'static str,
        source: RepoError,
    },
}

impl RosterError {
    /// Short pt-BR message safe to show to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation { message, .. } => *message,
            Self::NotFound(_) => "Cadastro não encontrado",
            Self::Persistence { operation, .. } => match *operation {
                "create_child" => "Erro ao cadastrar criança",
                "update_child" => "Erro ao atualizar criança",
                "deactivate_child" => "Erro ao remover criança",
                "create_servant" => "Erro ao cadastrar servo",
                "update_servant" => "Erro ao atualizar servo",
                "deactivate_servant" => "Erro ao remover servo",
                "resolve_service" => "Erro ao criar culto",
                "assign_servant" => "Erro ao escalar servo",
                "remove_assignment" => "Erro ao remover escalação",
                _ => "Erro ao buscar cadastros",
            },
        }
    }

    pub(crate) fn from_repo(operation: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| match source {
            RepoError::NotFound(id) => {
                warn!("event={operation} module=roster status=rejected reason=not_found id={id}");
                Self::NotFound(id)
            }
            source => {
                error!(
                    "event={operation} module=roster status=error error_code={} error={source}",
                    source.code()
                );
                Self::Persistence { operation, source }
            }
        }
    }

    pub(crate) fn validation(
        operation: &'static str,
        field: &'static str,
        message: &'static str,
    ) -> Self {
        warn!("event={operation} module=roster status=rejected field={field}");
        Self::Validation { field, message }
    }
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, .. } => write!(f, "missing or blank field `{field}`"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Persistence { operation, source } => {
                write!(f, "{operation} failed [{}]: {source}", source.code())
            }
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Child roster service facade over repository implementations.
pub struct ChildService<R: ChildRepository> {
    repo: R,
}

impl<R: ChildRepository> ChildService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new active child and returns the stored record.
    pub fn create_child(&self, input: &NewChild) -> Result<Child, RosterError> {
        let fields = validate_child(input, "create_child")?;
        let id = self
            .repo
            .create_child(&fields)
            .map_err(RosterError::from_repo("create_child"))?;
        info!("event=create_child module=roster status=ok child_id={id}");
        self.read_back(id, "create_child")
    }

    /// Replaces every editable field of an existing child.
    pub fn update_child(&self, id: ChildId, input: &NewChild) -> Result<Child, RosterError> {
        let fields = validate_child(input, "update_child")?;
        self.repo
            .update_child(id, &fields)
            .map_err(RosterError::from_repo("update_child"))?;
        info!("event=update_child module=roster status=ok child_id={id}");
        self.read_back(id, "update_child")
    }

    /// Soft-deletes a child (`active = false`).
    pub fn deactivate_child(&self, id: ChildId) -> Result<(), RosterError> {
        self.repo
            .deactivate_child(id)
            .map_err(RosterError::from_repo("deactivate_child"))?;
        info!("event=deactivate_child module=roster status=ok child_id={id}");
        Ok(())
    }

    pub fn get_child(&self, id: ChildId) -> Result<Option<Child>, RosterError> {
        self.repo
            .get_child(id)
            .map_err(RosterError::from_repo("get_child"))
    }

    /// Active children ordered by name.
    pub fn list_active_children(&self) -> Result<Vec<Child>, RosterError> {
        self.repo
            .list_children(&ChildListQuery::default())
            .map_err(RosterError::from_repo("list_children"))
    }

    /// Active children whose age on `today` falls into `classroom`.
    pub fn list_active_children_in_classroom(
        &self,
        classroom: &str,
        today: NaiveDate,
    ) -> Result<Vec<Child>, RosterError> {
        let children = self.list_active_children()?;
        Ok(children
            .into_iter()
            .filter(|child| {
                classroom_for_birth_date(child.birth_date, today)
                    .is_some_and(|bucket| bucket.id == classroom)
            })
            .collect())
    }

    fn read_back(&self, id: ChildId, operation: &'static str) -> Result<Child, RosterError> {
        self.repo
            .get_child(id)
            .map_err(RosterError::from_repo(operation))?
            .ok_or(RosterError::NotFound(id))
    }
}

fn validate_child(input: &NewChild, operation: &'static str) -> Result<ChildFields, RosterError> {
    const MESSAGE: &str = "Todos os campos são obrigatórios";
    let field = |value: &str, name: &'static str| -> Result<String, RosterError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RosterError::validation(operation, name, MESSAGE));
        }
        Ok(trimmed.to_string())
    };

    let name = field(&input.name, "name")?;
    let Some(birth_date) = input.birth_date else {
        return Err(RosterError::validation(operation, "birth_date", MESSAGE));
    };
    Ok(ChildFields {
        name,
        birth_date,
        guardian_name: field(&input.guardian_name, "guardian_name")?,
        guardian_relationship: field(&input.guardian_relationship, "guardian_relationship")?,
        phone: field(&input.phone, "phone")?,
    })
}
