//! Document export collaborator.
//!
//! # Responsibility
//! - Define the `DocumentExporter` seam consumed by presentation layers.
//! - Ship a CSV implementation for roster and monthly attendance reports.
//!
//! # Invariants
//! - Exporters only format rows they are given; no store access.
//! - File names are stable: `criancas-<label>-<date>`, `servos-<date>`,
//!   `presenca-<month label>`.

use crate::model::attendance::AttendanceEntry;
use crate::model::child::Child;
use crate::model::classroom::{
    classroom_for_birth_date, classroom_label, format_age, format_phone, format_time_slot,
};
use crate::model::servant::Servant;
use crate::report::grouping::{classroom_totals, group_attendance};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Rendered file handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl ExportError {
    pub fn user_message(&self) -> &'static str {
        "Erro ao gerar relatório"
    }
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv encoding failed: {err}"),
            Self::Io(err) => write!(f, "document buffer failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Consumer of already computed report rows.
pub trait DocumentExporter {
    fn export_children(
        &self,
        children: &[Child],
        classroom_label: &str,
    ) -> Result<ExportedDocument, ExportError>;
    fn export_servants(&self, servants: &[Servant]) -> Result<ExportedDocument, ExportError>;
    fn export_attendance(
        &self,
        entries: &[AttendanceEntry],
        month_label: &str,
    ) -> Result<ExportedDocument, ExportError>;
}

/// CSV exporter; `generated_on` drives ages and file name dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExporter {
    generated_on: NaiveDate,
}

impl CsvExporter {
    pub fn new(generated_on: NaiveDate) -> Self {
        Self { generated_on }
    }

    fn finish(
        &self,
        writer: csv::Writer<Vec<u8>>,
        file_stem: String,
    ) -> Result<ExportedDocument, ExportError> {
        let bytes = writer.into_inner().map_err(|err| {
            ExportError::Io(std::io::Error::new(err.error().kind(), err.to_string()))
        })?;
        Ok(ExportedDocument {
            file_name: format!("{file_stem}.csv"),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        })
    }
}

impl DocumentExporter for CsvExporter {
    fn export_children(
        &self,
        children: &[Child],
        classroom_label_text: &str,
    ) -> Result<ExportedDocument, ExportError> {
        let mut writer = csv_writer();
        writer.write_record(["Nome", "Nascimento", "Idade", "Sala", "Responsável", "Telefone"])?;
        for child in children {
            let classroom = classroom_for_birth_date(child.birth_date, self.generated_on)
                .map_or("-", |classroom| classroom.label);
            writer.write_record([
                child.name.clone(),
                child.birth_date.format("%d/%m/%Y").to_string(),
                format_age(child.birth_date, self.generated_on),
                classroom.to_string(),
                format!("{} ({})", child.guardian_name, child.guardian_relationship),
                format_phone(&child.phone),
            ])?;
        }
        writer.write_record(["Total".to_string(), children.len().to_string()])?;

        info!(
            "event=export_children module=report status=ok rows={}",
            children.len()
        );
        self.finish(
            writer,
            format!(
                "criancas-{}-{}",
                slug(classroom_label_text),
                self.generated_on.format("%Y-%m-%d")
            ),
        )
    }

    fn export_servants(&self, servants: &[Servant]) -> Result<ExportedDocument, ExportError> {
        let mut writer = csv_writer();
        writer.write_record(["Nome", "Telefone"])?;
        for servant in servants {
            let phone = servant
                .phone
                .as_deref()
                .map_or_else(|| "-".to_string(), format_phone);
            writer.write_record([servant.name.as_str(), phone.as_str()])?;
        }
        writer.write_record(["Total".to_string(), servants.len().to_string()])?;

        info!(
            "event=export_servants module=report status=ok rows={}",
            servants.len()
        );
        self.finish(
            writer,
            format!("servos-{}", self.generated_on.format("%Y-%m-%d")),
        )
    }

    fn export_attendance(
        &self,
        entries: &[AttendanceEntry],
        month_label: &str,
    ) -> Result<ExportedDocument, ExportError> {
        let mut writer = csv_writer();
        writer.write_record(["Data", "Culto", "Sala", "Nº", "Nome", "Tipo"])?;
        for date_group in group_attendance(entries) {
            let date = date_group.service_date.format("%d/%m/%Y").to_string();
            for slot_group in &date_group.time_slots {
                let slot = format_time_slot(&slot_group.time_slot);
                for room_group in &slot_group.classrooms {
                    let room = classroom_label(&room_group.classroom);
                    for (index, entry) in room_group.entries.iter().enumerate() {
                        let kind = if entry.is_visitor() { "Visitante" } else { "Membro" };
                        let number = (index + 1).to_string();
                        writer.write_record([
                            date.as_str(),
                            slot.as_str(),
                            room.as_str(),
                            number.as_str(),
                            entry.display_name.as_str(),
                            kind,
                        ])?;
                    }
                }
            }
        }

        let totals = classroom_totals(entries);
        for (classroom, count) in &totals.per_classroom {
            writer.write_record(["Total".to_string(), classroom.label.to_string(), count.to_string()])?;
        }
        if totals.other > 0 {
            writer.write_record(["Total".to_string(), "Outras".to_string(), totals.other.to_string()])?;
        }
        writer.write_record(["Total".to_string(), "Geral".to_string(), totals.total.to_string()])?;

        info!(
            "event=export_attendance module=report status=ok rows={}",
            entries.len()
        );
        self.finish(writer, format!("presenca-{}", slug(month_label)))
    }
}

/// Totals rows are shorter than the header, so records are not fixed width.
fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new())
}

fn slug(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
