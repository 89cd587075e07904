use chrono::NaiveDate;
use redekids_core::db::open_db_in_memory;
use redekids_core::repo::child_repo::{ChildListQuery, ChildRepository, SqliteChildRepository};
use redekids_core::{
    home_summary, AssignServantRequest, AttendanceService, ChildService, NewChild, NewServant,
    RegisterAttendanceRequest, RosterError, ServantService, SqliteAttendanceRepository,
    SqliteServantRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_child(name: &str, birth_date: NaiveDate) -> NewChild {
    NewChild {
        name: name.to_string(),
        birth_date: Some(birth_date),
        guardian_name: "Rute".to_string(),
        guardian_relationship: "Mãe".to_string(),
        phone: "11987654321".to_string(),
    }
}

fn children(conn: &Connection) -> ChildService<SqliteChildRepository<'_>> {
    ChildService::new(SqliteChildRepository::try_new(conn).unwrap())
}

fn servants(conn: &Connection) -> ServantService<SqliteServantRepository<'_>> {
    ServantService::new(SqliteServantRepository::try_new(conn).unwrap())
}

#[test]
fn child_crud_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = children(&conn);

    let created = service
        .create_child(&new_child("  Davi ", date(2019, 5, 2)))
        .unwrap();
    assert_eq!(created.name, "Davi");
    assert!(created.active);

    let mut edit = new_child("Davi Lucas", date(2019, 5, 3));
    edit.guardian_relationship = "Pai".to_string();
    let updated = service.update_child(created.id, &edit).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Davi Lucas");
    assert_eq!(updated.birth_date, date(2019, 5, 3));
    assert_eq!(updated.guardian_relationship, "Pai");

    let loaded = service.get_child(created.id).unwrap().unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn deactivated_children_leave_active_listing_but_stay_stored() {
    let conn = open_db_in_memory().unwrap();
    let service = children(&conn);
    let bia = service.create_child(&new_child("bia", date(2020, 1, 1))).unwrap();
    service.create_child(&new_child("Ana", date(2020, 1, 1))).unwrap();
    service.create_child(&new_child("Caio", date(2020, 1, 1))).unwrap();

    service.deactivate_child(bia.id).unwrap();

    let names: Vec<String> = service
        .list_active_children()
        .unwrap()
        .into_iter()
        .map(|child| child.name)
        .collect();
    assert_eq!(names, vec!["Ana", "Caio"]);

    let stored = service.get_child(bia.id).unwrap().unwrap();
    assert!(!stored.active);

    let repo = SqliteChildRepository::try_new(&conn).unwrap();
    let everyone = repo
        .list_children(&ChildListQuery {
            include_inactive: true,
        })
        .unwrap();
    assert_eq!(everyone.len(), 3);
    assert_eq!(everyone[1].name, "bia");
}

#[test]
fn unknown_child_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = children(&conn);
    let missing = Uuid::new_v4();

    let err = service.deactivate_child(missing).unwrap_err();
    assert!(matches!(err, RosterError::NotFound(id) if id == missing));
    assert_eq!(err.user_message(), "Cadastro não encontrado");

    let err = service
        .update_child(missing, &new_child("Ana", date(2020, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, RosterError::NotFound(_)));
    assert!(service.get_child(missing).unwrap().is_none());
}

#[test]
fn child_with_blank_guardian_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = children(&conn);
    let mut input = new_child("Ana", date(2020, 1, 1));
    input.guardian_name = " ".to_string();

    let err = service.create_child(&input).unwrap_err();

    assert!(matches!(err, RosterError::Validation { field: "guardian_name", .. }));
    assert!(service.list_active_children().unwrap().is_empty());
}

#[test]
fn classroom_listing_uses_age_on_the_given_day() {
    let conn = open_db_in_memory().unwrap();
    let service = children(&conn);
    service.create_child(&new_child("Bebê", date(2023, 6, 1))).unwrap();
    service.create_child(&new_child("Teo", date(2021, 2, 1))).unwrap();
    service.create_child(&new_child("Davi", date(2019, 5, 2))).unwrap();
    service.create_child(&new_child("Lara", date(2016, 1, 10))).unwrap();

    let today = date(2024, 3, 3);
    let names = |classroom: &str| -> Vec<String> {
        service
            .list_active_children_in_classroom(classroom, today)
            .unwrap()
            .into_iter()
            .map(|child| child.name)
            .collect()
    };

    assert_eq!(names("maternal"), vec!["Teo"]);
    assert_eq!(names("jardim"), vec!["Davi"]);
    assert_eq!(names("primario"), vec!["Lara"]);
    assert!(names("berçário").is_empty());
}

#[test]
fn servant_phone_is_optional_and_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let service = servants(&conn);

    let marta = service
        .create_servant(&NewServant {
            name: " Marta ".to_string(),
            phone: Some("  ".to_string()),
        })
        .unwrap();
    assert_eq!(marta.name, "Marta");
    assert_eq!(marta.phone, None);

    let updated = service
        .update_servant(
            marta.id,
            &NewServant {
                name: "Marta".to_string(),
                phone: Some(" 1133224455 ".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("1133224455"));

    let err = service
        .create_servant(&NewServant::default())
        .unwrap_err();
    assert_eq!(err.user_message(), "Nome é obrigatório");
}

#[test]
fn deactivated_servants_leave_active_listing() {
    let conn = open_db_in_memory().unwrap();
    let service = servants(&conn);
    let marta = service
        .create_servant(&NewServant {
            name: "Marta".to_string(),
            phone: None,
        })
        .unwrap();

    service.deactivate_servant(marta.id).unwrap();

    assert!(service.list_active_servants().unwrap().is_empty());
    assert!(!service.get_servant(marta.id).unwrap().unwrap().active);
    assert!(matches!(
        service.deactivate_servant(Uuid::new_v4()),
        Err(RosterError::NotFound(_))
    ));
}

#[test]
fn assignments_create_the_service_and_allow_repeats() {
    let conn = open_db_in_memory().unwrap();
    let service = servants(&conn);
    let marta = service
        .create_servant(&NewServant {
            name: "Marta".to_string(),
            phone: None,
        })
        .unwrap();
    let sunday = date(2024, 3, 3);
    let request = AssignServantRequest {
        service_date: Some(sunday),
        time_slot: "morning".to_string(),
        servant_id: Some(marta.id),
        role: "professor".to_string(),
        classroom: "jardim".to_string(),
    };

    let first = service.assign_servant(&request).unwrap();
    let second = service.assign_servant(&request).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.service_id, second.service_id);

    let entries = service.list_assignments(sunday, "morning").unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.servant_name == "Marta"));
    assert!(entries.iter().all(|entry| entry.service_date == sunday));

    service.remove_assignment(first.id).unwrap();
    service.remove_assignment(first.id).unwrap();
    assert_eq!(service.list_assignments(sunday, "morning").unwrap().len(), 1);
}

#[test]
fn assignment_requires_every_field() {
    let conn = open_db_in_memory().unwrap();
    let service = servants(&conn);

    let err = service
        .assign_servant(&AssignServantRequest {
            service_date: Some(date(2024, 3, 3)),
            time_slot: "morning".to_string(),
            servant_id: Some(Uuid::new_v4()),
            role: String::new(),
            classroom: "jardim".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, RosterError::Validation { field: "role", .. }));
    assert!(service.list_assignments(date(2024, 3, 3), "morning").unwrap().is_empty());
}

#[test]
fn padded_slot_lists_the_schedule_it_created() {
    let conn = open_db_in_memory().unwrap();
    let service = servants(&conn);
    let marta = service
        .create_servant(&NewServant {
            name: "Marta".to_string(),
            phone: None,
        })
        .unwrap();
    let sunday = date(2024, 3, 3);
    service
        .assign_servant(&AssignServantRequest {
            service_date: Some(sunday),
            time_slot: " evening ".to_string(),
            servant_id: Some(marta.id),
            role: "auxiliar".to_string(),
            classroom: " jardim ".to_string(),
        })
        .unwrap();

    let entries = service.list_assignments(sunday, " evening ").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].time_slot, "evening");
    assert_eq!(entries[0].assignment.classroom, "jardim");

    let err = service.list_assignments(sunday, "  ").unwrap_err();
    assert!(matches!(err, RosterError::Validation { field: "time_slot", .. }));
}

#[test]
fn schedule_for_unknown_service_is_empty() {
    let conn = open_db_in_memory().unwrap();
    assert!(servants(&conn)
        .list_assignments(date(2024, 3, 10), "evening")
        .unwrap()
        .is_empty());
}

#[test]
fn home_summary_counts_roster_and_attendance() {
    let conn = open_db_in_memory().unwrap();
    let child_service = children(&conn);
    let mut ids = Vec::new();
    for name in ["Ana", "Bento", "Caio", "Duda"] {
        ids.push(
            child_service
                .create_child(&new_child(name, date(2019, 5, 2)))
                .unwrap()
                .id,
        );
    }
    child_service.deactivate_child(ids[3]).unwrap();
    servants(&conn)
        .create_servant(&NewServant {
            name: "Marta".to_string(),
            phone: None,
        })
        .unwrap();

    let attendance = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());
    let today = date(2024, 3, 10);
    for (day, children) in [(date(2024, 3, 3), &ids[..2]), (today, &ids[..3])] {
        attendance
            .register_attendance(&RegisterAttendanceRequest {
                service_date: day,
                time_slot: "morning".to_string(),
                classroom: "jardim".to_string(),
                child_ids: children.to_vec(),
            })
            .unwrap();
    }

    let summary = home_summary(
        &SqliteChildRepository::try_new(&conn).unwrap(),
        &SqliteServantRepository::try_new(&conn).unwrap(),
        &SqliteAttendanceRepository::try_new(&conn).unwrap(),
        today,
    )
    .unwrap();

    assert_eq!(summary.active_children, 3);
    assert_eq!(summary.active_servants, 1);
    assert_eq!(summary.attendance_this_month, 5);
    assert_eq!(summary.attendance_today, 3);
    assert_eq!(summary.recent_children.len(), 3);
    assert!(summary.recent_children.iter().all(|child| child.active));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["active_children"], 3);
}
