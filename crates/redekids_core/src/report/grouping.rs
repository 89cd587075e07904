//! Presentation grouping for monthly attendance.

use crate::model::attendance::AttendanceEntry;
use crate::model::classroom::{classroom_rank, time_slot_rank, Classroom, CLASSROOMS};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomGroup<'a> {
    pub classroom: String,
    pub entries: Vec<&'a AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlotGroup<'a> {
    pub time_slot: String,
    pub classrooms: Vec<ClassroomGroup<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a> {
    pub service_date: NaiveDate,
    pub time_slots: Vec<TimeSlotGroup<'a>>,
}

/// Per-classroom attendance counts for a report header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomTotals {
    /// One entry per known classroom, in table order, zeros included.
    pub per_classroom: Vec<(&'static Classroom, usize)>,
    /// Records filed under classroom ids outside the table.
    pub other: usize,
    pub total: usize,
}

/// Groups entries by date (ascending), then time slot (morning, evening,
/// custom), then classroom (table order, unknown ids last).
///
/// Entry order inside a classroom is preserved.
pub fn group_attendance(entries: &[AttendanceEntry]) -> Vec<DateGroup<'_>> {
    type SlotKey = (u8, String);
    type RoomKey = (usize, String);
    let mut tree: BTreeMap<NaiveDate, BTreeMap<SlotKey, BTreeMap<RoomKey, Vec<&AttendanceEntry>>>> =
        BTreeMap::new();

    for entry in entries {
        tree.entry(entry.service_date)
            .or_default()
            .entry((time_slot_rank(&entry.time_slot), entry.time_slot.clone()))
            .or_default()
            .entry((classroom_rank(entry.classroom()), entry.classroom().to_string()))
            .or_default()
            .push(entry);
    }

    tree.into_iter()
        .map(|(service_date, slots)| DateGroup {
            service_date,
            time_slots: slots
                .into_iter()
                .map(|((_, time_slot), rooms)| TimeSlotGroup {
                    time_slot,
                    classrooms: rooms
                        .into_iter()
                        .map(|((_, classroom), entries)| ClassroomGroup { classroom, entries })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

pub fn classroom_totals(entries: &[AttendanceEntry]) -> ClassroomTotals {
    let per_classroom: Vec<(&'static Classroom, usize)> = CLASSROOMS
        .iter()
        .map(|classroom| {
            let count = entries
                .iter()
                .filter(|entry| entry.classroom() == classroom.id)
                .count();
            (classroom, count)
        })
        .collect();
    let known: usize = per_classroom.iter().map(|(_, count)| count).sum();

    ClassroomTotals {
        per_classroom,
        other: entries.len() - known,
        total: entries.len(),
    }
}

/// `Fevereiro 2024`; `None` for an invalid month.
pub fn month_label(year: i32, month: u32) -> Option<String> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES
        .get(index)
        .map(|name| format!("{name} {year}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use uuid::Uuid;

    fn entry(date: (i32, u32, u32), slot: &str, classroom: &str, name: &str) -> AttendanceEntry {
        AttendanceEntry {
            record: AttendanceRecord::member(Uuid::new_v4(), classroom, Uuid::new_v4()),
            service_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
            time_slot: slot.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn groups_follow_date_slot_and_classroom_order() {
        let entries = vec![
            entry((2024, 3, 10), "evening", "primario", "A"),
            entry((2024, 3, 3), "especial", "jardim", "B"),
            entry((2024, 3, 3), "morning", "extra", "C"),
            entry((2024, 3, 3), "morning", "maternal", "D"),
            entry((2024, 3, 3), "morning", "maternal", "E"),
        ];

        let groups = group_attendance(&entries);

        assert_eq!(groups.len(), 2);
        let first = &groups[0];
        assert_eq!(first.service_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        let slots: Vec<&str> = first.time_slots.iter().map(|s| s.time_slot.as_str()).collect();
        assert_eq!(slots, vec!["morning", "especial"]);
        let rooms: Vec<&str> = first.time_slots[0]
            .classrooms
            .iter()
            .map(|c| c.classroom.as_str())
            .collect();
        assert_eq!(rooms, vec!["maternal", "extra"]);
        let names: Vec<&str> = first.time_slots[0].classrooms[0]
            .entries
            .iter()
            .map(|e| e.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["D", "E"]);
    }

    #[test]
    fn totals_count_known_and_other_classrooms() {
        let entries = vec![
            entry((2024, 3, 3), "morning", "jardim", "A"),
            entry((2024, 3, 3), "morning", "jardim", "B"),
            entry((2024, 3, 3), "morning", "extra", "C"),
        ];
        let totals = classroom_totals(&entries);
        assert_eq!(totals.total, 3);
        assert_eq!(totals.other, 1);
        let jardim = totals
            .per_classroom
            .iter()
            .find(|(c, _)| c.id == "jardim")
            .map(|(_, n)| *n);
        assert_eq!(jardim, Some(2));
        assert_eq!(totals.per_classroom.len(), CLASSROOMS.len());
    }

    #[test]
    fn month_labels_are_portuguese() {
        assert_eq!(month_label(2024, 2).as_deref(), Some("Fevereiro 2024"));
        assert_eq!(month_label(2024, 0), None);
        assert_eq!(month_label(2024, 13), None);
    }
}
