//! Output helpers shared by command handlers.

use chrono::NaiveDate;
use redekids_core::model::classroom::{
    classroom_for_birth_date, format_age, format_phone,
};
use redekids_core::{AttendanceError, Child, DbError, ExportError, RepoError, RosterError, Servant};

/// Message printed to the terminal for a failed command.
///
/// Core errors carry their own localized message; the full chain only goes
/// to the log file.
pub fn user_message(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<AttendanceError>() {
        return err.user_message().to_string();
    }
    if let Some(err) = err.downcast_ref::<RosterError>() {
        return err.user_message().to_string();
    }
    if let Some(err) = err.downcast_ref::<ExportError>() {
        return err.user_message().to_string();
    }
    if err.downcast_ref::<DbError>().is_some() || err.downcast_ref::<RepoError>().is_some() {
        return "Erro ao acessar o banco de dados".to_string();
    }
    format!("Erro: {err}")
}

pub fn child_line(child: &Child, today: NaiveDate) -> String {
    let classroom =
        classroom_for_birth_date(child.birth_date, today).map_or("-", |classroom| classroom.label);
    format!(
        "{}  {}  {}  {}  {} ({})  {}",
        child.id,
        child.name,
        format_age(child.birth_date, today),
        classroom,
        child.guardian_name,
        child.guardian_relationship,
        format_phone(&child.phone)
    )
}

pub fn servant_line(servant: &Servant) -> String {
    let phone = servant
        .phone
        .as_deref()
        .map_or_else(|| "-".to_string(), format_phone);
    format!("{}  {}  {}", servant.id, servant.name, phone)
}
