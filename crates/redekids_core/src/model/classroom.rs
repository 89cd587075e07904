//! Age-bucketed classroom classification.
//!
//! # Responsibility
//! - Map a birth date (relative to an explicit `today`) to a classroom.
//! - Produce the human warning shown when no classroom fits.
//! - Provide display helpers for classroom ids, ages and time slots.
//!
//! # Invariants
//! - `CLASSROOMS` is ordered and its ranges do not overlap.
//! - `classroom_for_age(age).is_none() == age_warning_for_age(age).is_some()`
//!   for every age.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// One age bucket with inclusive bounds in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classroom {
    /// Stable identifier persisted in attendance rows.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    pub min_age: i32,
    pub max_age: i32,
}

impl Classroom {
    pub fn contains_age(&self, age: i32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

pub static CLASSROOMS: [Classroom; 3] = [
    Classroom {
        id: "maternal",
        label: "Maternal",
        min_age: 2,
        max_age: 3,
    },
    Classroom {
        id: "jardim",
        label: "Jardim",
        min_age: 4,
        max_age: 6,
    },
    Classroom {
        id: "primario",
        label: "Primário",
        min_age: 7,
        max_age: 9,
    },
];

/// Guardian relationships offered when registering a child.
pub const RELATIONSHIPS: [&str; 7] = [
    "Pai",
    "Mãe",
    "Avô",
    "Avó",
    "Tio(a)",
    "Responsável legal",
    "Outro",
];

/// Reason why a child has no classroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeWarning {
    /// Younger than the first bucket.
    NoClassroom,
    /// 10 or 11 years old.
    NextAgeGroup,
    /// Older than 11.
    YouthGroup,
}

impl AgeWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoClassroom => "Não há salinhas disponíveis para essa idade.",
            Self::NextAgeGroup => "Essa criança deve ser integrada à Rede Jump.",
            Self::YouthGroup => "Essa criança deve ser integrada à Rede Livre (adolescentes).",
        }
    }
}

/// Whole years elapsed between `birth` and `today`.
///
/// Negative when `birth` lies in the future.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// Whole months elapsed between `birth` and `today`.
///
/// A birth day past the end of a shorter month counts as reached on that
/// month's last day (Jan 31 to Feb 29 is one month). Future births yield
/// zero or less.
pub fn age_in_months(birth: NaiveDate, today: NaiveDate) -> i32 {
    let months = (today.year() - birth.year()) * 12 + today.month() as i32
        - birth.month() as i32;
    if months <= 0 {
        return months;
    }
    match birth.checked_add_months(Months::new(months as u32)) {
        Some(anniversary) if anniversary > today => months - 1,
        _ => months,
    }
}

/// Returns the first classroom whose range contains `age`.
pub fn classroom_for_age(age: i32) -> Option<&'static Classroom> {
    CLASSROOMS.iter().find(|classroom| classroom.contains_age(age))
}

pub fn classroom_for_birth_date(birth: NaiveDate, today: NaiveDate) -> Option<&'static Classroom> {
    classroom_for_age(age_in_years(birth, today))
}

pub fn age_warning_for_age(age: i32) -> Option<AgeWarning> {
    match age {
        age if age < 2 => Some(AgeWarning::NoClassroom),
        10 | 11 => Some(AgeWarning::NextAgeGroup),
        age if age > 11 => Some(AgeWarning::YouthGroup),
        _ => None,
    }
}

pub fn age_warning(birth: NaiveDate, today: NaiveDate) -> Option<AgeWarning> {
    age_warning_for_age(age_in_years(birth, today))
}

pub fn find_classroom(id: &str) -> Option<&'static Classroom> {
    CLASSROOMS.iter().find(|classroom| classroom.id == id)
}

/// Display label for a classroom id, falling back to the id itself.
pub fn classroom_label(id: &str) -> String {
    find_classroom(id).map_or_else(|| id.to_string(), |classroom| classroom.label.to_string())
}

/// Label including the age range, e.g. `Jardim (4-6 anos)`.
pub fn classroom_label_with_ages(id: &str) -> String {
    match find_classroom(id) {
        Some(classroom) => format!(
            "{} ({}-{} anos)",
            classroom.label, classroom.min_age, classroom.max_age
        ),
        None => id.to_string(),
    }
}

/// Position of a classroom in `CLASSROOMS`; unknown ids sort last.
pub fn classroom_rank(id: &str) -> usize {
    CLASSROOMS
        .iter()
        .position(|classroom| classroom.id == id)
        .unwrap_or(usize::MAX)
}

/// Human age, in months below one year and in years otherwise.
pub fn format_age(birth: NaiveDate, today: NaiveDate) -> String {
    let years = age_in_years(birth, today);
    if years < 1 {
        let months = age_in_months(birth, today).max(0);
        return format!("{months} {}", if months == 1 { "mês" } else { "meses" });
    }
    format!("{years} {}", if years == 1 { "ano" } else { "anos" })
}

pub fn format_time_slot(time_slot: &str) -> String {
    match time_slot {
        "morning" => "Manhã (10h)".to_string(),
        "evening" => "Noite (18h)".to_string(),
        other => other.to_string(),
    }
}

/// Sort key for time slots: morning, evening, then anything custom.
pub fn time_slot_rank(time_slot: &str) -> u8 {
    match time_slot {
        "morning" => 0,
        "evening" => 1,
        _ => 2,
    }
}

/// Formats 10/11 digit phone numbers as `(DD) DDDD-DDDD` / `(DD) DDDDD-DDDD`.
///
/// Any other input is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}
