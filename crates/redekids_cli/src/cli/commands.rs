//! Command handlers. Each maps onto one core operation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use redekids_core::db::migrations::latest_version;
use redekids_core::model::classroom::{age_warning, classroom_label, format_time_slot};
use redekids_core::report::grouping::{classroom_totals, group_attendance, month_label};
use redekids_core::{
    home_summary, AssignServantRequest, AttendanceService, ChildService, CsvExporter,
    DocumentExporter, ExportedDocument, NewChild, NewServant, RegisterAttendanceRequest,
    RegisterVisitorRequest, ServantService, SqliteAttendanceRepository, SqliteChildRepository,
    SqliteServantRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

use super::helpers::{child_line, servant_line};
use super::ChildFieldArgs;

fn child_service(conn: &Connection) -> anyhow::Result<ChildService<SqliteChildRepository<'_>>> {
    Ok(ChildService::new(SqliteChildRepository::try_new(conn)?))
}

fn servant_service(
    conn: &Connection,
) -> anyhow::Result<ServantService<SqliteServantRepository<'_>>> {
    Ok(ServantService::new(SqliteServantRepository::try_new(conn)?))
}

fn attendance_service(
    conn: &Connection,
) -> anyhow::Result<AttendanceService<SqliteAttendanceRepository<'_>>> {
    let repo = SqliteAttendanceRepository::try_new(conn)?;
    Ok(AttendanceService::new(repo))
}

fn new_child(fields: &ChildFieldArgs) -> NewChild {
    NewChild {
        name: fields.name.clone(),
        birth_date: Some(fields.birth_date),
        guardian_name: fields.guardian.clone(),
        guardian_relationship: fields.relationship.clone(),
        phone: fields.phone.clone(),
    }
}

fn warn_about_age(birth_date: NaiveDate, today: NaiveDate) {
    if let Some(warning) = age_warning(birth_date, today) {
        println!("Aviso: {}", warning.message());
    }
}

fn write_document(out: &Path, document: &ExportedDocument) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let path = out.join(&document.file_name);
    std::fs::write(&path, &document.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn cmd_init(db: &Path) -> anyhow::Result<()> {
    println!(
        "Banco de dados pronto em {} (schema v{}, core {} {})",
        db.display(),
        latest_version(),
        redekids_core::core_version(),
        redekids_core::ping()
    );
    Ok(())
}

pub fn cmd_child_add(
    conn: &Connection,
    fields: &ChildFieldArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let child = child_service(conn)?.create_child(&new_child(fields))?;
    println!("Criança cadastrada: {}", child_line(&child, today));
    warn_about_age(child.birth_date, today);
    Ok(())
}

pub fn cmd_child_edit(
    conn: &Connection,
    id: Uuid,
    fields: &ChildFieldArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let child = child_service(conn)?.update_child(id, &new_child(fields))?;
    println!("Criança atualizada: {}", child_line(&child, today));
    warn_about_age(child.birth_date, today);
    Ok(())
}

pub fn cmd_child_remove(conn: &Connection, id: Uuid) -> anyhow::Result<()> {
    child_service(conn)?.deactivate_child(id)?;
    println!("Criança removida.");
    Ok(())
}

pub fn cmd_child_list(
    conn: &Connection,
    classroom: Option<&str>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let service = child_service(conn)?;
    let children = match classroom {
        Some(classroom) => service.list_active_children_in_classroom(classroom, today)?,
        None => service.list_active_children()?,
    };
    for child in &children {
        println!("{}", child_line(child, today));
    }
    println!("Total: {}", children.len());
    Ok(())
}

pub fn cmd_servant_add(
    conn: &Connection,
    name: String,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let servant = servant_service(conn)?.create_servant(&NewServant { name, phone })?;
    println!("Servo cadastrado: {}", servant_line(&servant));
    Ok(())
}

pub fn cmd_servant_edit(
    conn: &Connection,
    id: Uuid,
    name: String,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let servant = servant_service(conn)?.update_servant(id, &NewServant { name, phone })?;
    println!("Servo atualizado: {}", servant_line(&servant));
    Ok(())
}

pub fn cmd_servant_remove(conn: &Connection, id: Uuid) -> anyhow::Result<()> {
    servant_service(conn)?.deactivate_servant(id)?;
    println!("Servo removido.");
    Ok(())
}

pub fn cmd_servant_list(conn: &Connection) -> anyhow::Result<()> {
    let servants = servant_service(conn)?.list_active_servants()?;
    for servant in &servants {
        println!("{}", servant_line(servant));
    }
    println!("Total: {}", servants.len());
    Ok(())
}

pub fn cmd_servant_assign(
    conn: &Connection,
    date: NaiveDate,
    slot: String,
    servant: Uuid,
    role: String,
    classroom: String,
) -> anyhow::Result<()> {
    let assignment = servant_service(conn)?.assign_servant(&AssignServantRequest {
        service_date: Some(date),
        time_slot: slot,
        servant_id: Some(servant),
        role,
        classroom,
    })?;
    println!(
        "Escala criada: {} ({} em {})",
        assignment.id,
        assignment.role,
        classroom_label(&assignment.classroom)
    );
    Ok(())
}

pub fn cmd_servant_unassign(conn: &Connection, id: Uuid) -> anyhow::Result<()> {
    servant_service(conn)?.remove_assignment(id)?;
    println!("Escala removida.");
    Ok(())
}

pub fn cmd_servant_schedule(conn: &Connection, date: NaiveDate, slot: &str) -> anyhow::Result<()> {
    let entries = servant_service(conn)?.list_assignments(date, slot)?;
    println!("{} - {}", date.format("%d/%m/%Y"), format_time_slot(slot));
    if entries.is_empty() {
        println!("Nenhum servo escalado.");
    }
    for entry in &entries {
        println!(
            "{}  {}  {}  {}",
            entry.assignment.id,
            classroom_label(&entry.assignment.classroom),
            entry.assignment.role,
            entry.servant_name
        );
    }
    Ok(())
}

pub fn cmd_attendance_register(
    conn: &Connection,
    date: NaiveDate,
    slot: String,
    classroom: String,
    child_ids: Vec<Uuid>,
) -> anyhow::Result<()> {
    let inserted = attendance_service(conn)?.register_attendance(&RegisterAttendanceRequest {
        service_date: date,
        time_slot: slot,
        classroom,
        child_ids,
    })?;
    println!("{inserted} presença(s) registrada(s).");
    Ok(())
}

pub fn cmd_attendance_visitor(
    conn: &Connection,
    request: RegisterVisitorRequest,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let record = attendance_service(conn)?.register_visitor(&request, today)?;
    println!(
        "Visitante registrado em {}: {}",
        classroom_label(&record.classroom),
        record.id
    );
    Ok(())
}

pub fn cmd_attendance_remove(conn: &Connection, id: Uuid) -> anyhow::Result<()> {
    attendance_service(conn)?.remove_attendance(id)?;
    println!("Presença removida.");
    Ok(())
}

pub fn cmd_attendance_registered(
    conn: &Connection,
    date: NaiveDate,
    slot: &str,
    classroom: &str,
) -> anyhow::Result<()> {
    let ids = attendance_service(conn)?.list_registered_child_ids(date, slot, classroom)?;
    for id in &ids {
        println!("{id}");
    }
    println!("Total: {}", ids.len());
    Ok(())
}

pub fn cmd_attendance_month(conn: &Connection, year: i32, month: u32) -> anyhow::Result<()> {
    let entries = attendance_service(conn)?.attendance_for_month(year, month)?;
    let label = month_label(year, month).context("invalid month")?;
    println!("Presença - {label}");
    if entries.is_empty() {
        println!("Nenhum registro.");
        return Ok(());
    }

    for day in group_attendance(&entries) {
        println!();
        println!("{}", day.service_date.format("%d/%m/%Y"));
        for slot in &day.time_slots {
            println!("  {}", format_time_slot(&slot.time_slot));
            for classroom in &slot.classrooms {
                println!(
                    "    {} ({})",
                    classroom_label(&classroom.classroom),
                    classroom.entries.len()
                );
                for (index, entry) in classroom.entries.iter().enumerate() {
                    let marker = if entry.is_visitor() { " (visitante)" } else { "" };
                    println!(
                        "      {}. {}{marker}  [{}]",
                        index + 1,
                        entry.display_name,
                        entry.record.id
                    );
                }
            }
        }
    }

    let totals = classroom_totals(&entries);
    println!();
    for (classroom, count) in &totals.per_classroom {
        println!("{}: {count}", classroom.label);
    }
    if totals.other > 0 {
        println!("Outras: {}", totals.other);
    }
    println!("Total: {}", totals.total);
    Ok(())
}

pub fn cmd_export_children(
    conn: &Connection,
    classroom: Option<&str>,
    out: &Path,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let service = child_service(conn)?;
    let (children, label) = match classroom {
        Some(classroom) => (
            service.list_active_children_in_classroom(classroom, today)?,
            classroom_label(classroom),
        ),
        None => (service.list_active_children()?, "Todas".to_string()),
    };
    let document = CsvExporter::new(today).export_children(&children, &label)?;
    println!("Arquivo gerado: {}", write_document(out, &document)?.display());
    Ok(())
}

pub fn cmd_export_servants(conn: &Connection, out: &Path, today: NaiveDate) -> anyhow::Result<()> {
    let servants = servant_service(conn)?.list_active_servants()?;
    let document = CsvExporter::new(today).export_servants(&servants)?;
    println!("Arquivo gerado: {}", write_document(out, &document)?.display());
    Ok(())
}

pub fn cmd_export_attendance(
    conn: &Connection,
    year: i32,
    month: u32,
    out: &Path,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let entries = attendance_service(conn)?.attendance_for_month(year, month)?;
    let label = month_label(year, month).context("invalid month")?;
    let document = CsvExporter::new(today).export_attendance(&entries, &label)?;
    println!("Arquivo gerado: {}", write_document(out, &document)?.display());
    Ok(())
}

pub fn cmd_summary(conn: &Connection, today: NaiveDate) -> anyhow::Result<()> {
    let summary = home_summary(
        &SqliteChildRepository::try_new(conn)?,
        &SqliteServantRepository::try_new(conn)?,
        &SqliteAttendanceRepository::try_new(conn)?,
        today,
    )?;
    println!("Crianças ativas: {}", summary.active_children);
    println!("Servos ativos: {}", summary.active_servants);
    println!("Presenças no mês: {}", summary.attendance_this_month);
    println!("Presenças hoje: {}", summary.attendance_today);
    if !summary.recent_children.is_empty() {
        println!("Cadastros recentes:");
        for child in &summary.recent_children {
            println!("  {}", child_line(child, today));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_the_document_under_its_file_name() {
        let dir = std::env::temp_dir().join(format!("redekids-export-{}", Uuid::new_v4()));
        let document = ExportedDocument {
            file_name: "servos-2024-03-01.csv".to_string(),
            content_type: "text/csv; charset=utf-8",
            bytes: b"Nome,Telefone\n".to_vec(),
        };

        let path = write_document(&dir, &document).unwrap();

        assert_eq!(path, dir.join("servos-2024-03-01.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), document.bytes);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn handlers_run_against_an_in_memory_database() {
        let conn = redekids_core::open_db_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let fields = ChildFieldArgs {
            name: "Davi".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2019, 5, 2).unwrap(),
            guardian: "Rute".to_string(),
            relationship: "Mãe".to_string(),
            phone: "11987654321".to_string(),
        };

        cmd_child_add(&conn, &fields, today).unwrap();
        let child = child_service(&conn).unwrap().list_active_children().unwrap()[0].clone();
        cmd_attendance_register(
            &conn,
            today,
            "morning".to_string(),
            "jardim".to_string(),
            vec![child.id],
        )
        .unwrap();

        let err = cmd_attendance_register(
            &conn,
            today,
            "morning".to_string(),
            "jardim".to_string(),
            vec![child.id],
        )
        .unwrap_err();
        assert_eq!(
            crate::cli::helpers::user_message(&err),
            "Todas as crianças já foram registradas neste culto"
        );

        cmd_attendance_month(&conn, 2024, 3).unwrap();
        cmd_summary(&conn, today).unwrap();
    }
}
