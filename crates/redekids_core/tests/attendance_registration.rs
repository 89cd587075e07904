use chrono::NaiveDate;
use redekids_core::db::open_db_in_memory;
use redekids_core::model::attendance::UNKNOWN_CHILD_NAME;
use redekids_core::repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
use redekids_core::repo::child_repo::SqliteChildRepository;
use redekids_core::{
    AttendanceError, AttendanceService, Attendee, ChildId, ChildService, NewChild,
    RegisterAttendanceRequest, RegisterVisitorRequest,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sunday() -> NaiveDate {
    date(2024, 3, 3)
}

fn add_child(conn: &Connection, name: &str) -> ChildId {
    let service = ChildService::new(SqliteChildRepository::try_new(conn).unwrap());
    service
        .create_child(&NewChild {
            name: name.to_string(),
            birth_date: Some(date(2019, 5, 2)),
            guardian_name: "Rute".to_string(),
            guardian_relationship: "Mãe".to_string(),
            phone: "11987654321".to_string(),
        })
        .unwrap()
        .id
}

fn attendance(conn: &Connection) -> AttendanceService<SqliteAttendanceRepository<'_>> {
    AttendanceService::new(SqliteAttendanceRepository::try_new(conn).unwrap())
}

fn request(classroom: &str, child_ids: Vec<ChildId>) -> RegisterAttendanceRequest {
    RegisterAttendanceRequest {
        service_date: sunday(),
        time_slot: "morning".to_string(),
        classroom: classroom.to_string(),
        child_ids,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn resolving_the_same_service_twice_returns_the_same_id() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let first = service.resolve_service(sunday(), "morning").unwrap();
    let second = service.resolve_service(sunday(), "morning").unwrap();
    let evening = service.resolve_service(sunday(), "evening").unwrap();

    assert_eq!(first, second);
    assert_ne!(first, evening);
    assert_eq!(count(&conn, "services"), 2);
}

#[test]
fn registration_skips_children_already_present() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let b = add_child(&conn, "Bento");
    let c = add_child(&conn, "Caio");
    let service = attendance(&conn);

    assert_eq!(service.register_attendance(&request("jardim", vec![a, b])).unwrap(), 2);
    assert_eq!(
        service
            .register_attendance(&request("jardim", vec![a, b, c]))
            .unwrap(),
        1
    );

    let registered = service
        .list_registered_child_ids(sunday(), "morning", "jardim")
        .unwrap();
    assert_eq!(registered.len(), 3);
    assert_eq!(count(&conn, "attendance"), 3);
}

#[test]
fn fully_registered_batch_is_a_duplicate_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let service = attendance(&conn);
    service.register_attendance(&request("jardim", vec![a])).unwrap();

    let err = service
        .register_attendance(&request("jardim", vec![a, a]))
        .unwrap_err();

    assert!(matches!(err, AttendanceError::Duplicate));
    assert_eq!(
        err.user_message(),
        "Todas as crianças já foram registradas neste culto"
    );
    assert_eq!(count(&conn, "attendance"), 1);
}

#[test]
fn repeated_ids_in_one_request_are_inserted_once() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let service = attendance(&conn);

    assert_eq!(
        service
            .register_attendance(&request("jardim", vec![a, a, a]))
            .unwrap(),
        1
    );
}

#[test]
fn the_same_child_may_attend_two_classrooms_of_one_service() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let service = attendance(&conn);

    service.register_attendance(&request("jardim", vec![a])).unwrap();
    service.register_attendance(&request("primario", vec![a])).unwrap();

    assert_eq!(count(&conn, "attendance"), 2);
    assert_eq!(count(&conn, "services"), 1);
}

#[test]
fn empty_selection_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let err = service
        .register_attendance(&request("jardim", Vec::new()))
        .unwrap_err();

    assert!(matches!(err, AttendanceError::Validation { field: "child_ids", .. }));
    assert_eq!(err.user_message(), "Selecione pelo menos uma criança");
    assert_eq!(count(&conn, "services"), 0);
}

#[test]
fn visitor_outside_every_classroom_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let err = service
        .register_visitor(
            &RegisterVisitorRequest {
                service_date: Some(sunday()),
                time_slot: "morning".to_string(),
                name: "Lia".to_string(),
                birth_date: Some(date(2012, 1, 1)),
                ..RegisterVisitorRequest::default()
            },
            sunday(),
        )
        .unwrap_err();

    assert!(matches!(err, AttendanceError::AgeRange { age: 12 }));
    assert_eq!(count(&conn, "services"), 0);
    assert_eq!(count(&conn, "attendance"), 0);
}

#[test]
fn visitor_is_filed_under_the_classroom_for_their_age() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let record = service
        .register_visitor(
            &RegisterVisitorRequest {
                service_date: Some(sunday()),
                time_slot: "morning".to_string(),
                name: " Lia ".to_string(),
                birth_date: Some(date(2018, 6, 1)),
                guardian_name: Some("Paulo".to_string()),
                phone: Some("   ".to_string()),
            },
            sunday(),
        )
        .unwrap();

    assert_eq!(record.classroom, "jardim");
    match &record.attendee {
        Attendee::Visitor(details) => {
            assert_eq!(details.name, "Lia");
            assert_eq!(details.guardian_name.as_deref(), Some("Paulo"));
            assert_eq!(details.phone, None);
        }
        other => panic!("expected visitor, got {other:?}"),
    }
    assert_eq!(count(&conn, "attendance"), 1);
}

#[test]
fn visitor_without_birth_date_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let err = service
        .register_visitor(
            &RegisterVisitorRequest {
                service_date: Some(sunday()),
                time_slot: "morning".to_string(),
                name: "Lia".to_string(),
                ..RegisterVisitorRequest::default()
            },
            sunday(),
        )
        .unwrap_err();

    assert!(matches!(err, AttendanceError::Validation { field: "birth_date", .. }));
}

#[test]
fn visitors_do_not_count_as_registered_children() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);
    service
        .register_visitor(
            &RegisterVisitorRequest {
                service_date: Some(sunday()),
                time_slot: "morning".to_string(),
                name: "Lia".to_string(),
                birth_date: Some(date(2018, 6, 1)),
                ..RegisterVisitorRequest::default()
            },
            sunday(),
        )
        .unwrap();

    let registered = service
        .list_registered_child_ids(sunday(), "morning", "jardim")
        .unwrap();
    assert!(registered.is_empty());
}

#[test]
fn listing_registered_ids_never_creates_a_service() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    let registered = service
        .list_registered_child_ids(sunday(), "evening", "maternal")
        .unwrap();

    assert!(registered.is_empty());
    assert_eq!(count(&conn, "services"), 0);
}

#[test]
fn padded_slot_and_classroom_list_what_they_registered() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let service = attendance(&conn);

    let inserted = service
        .register_attendance(&RegisterAttendanceRequest {
            service_date: sunday(),
            time_slot: " morning ".to_string(),
            classroom: " jardim ".to_string(),
            child_ids: vec![a],
        })
        .unwrap();
    assert_eq!(inserted, 1);

    let padded = service
        .list_registered_child_ids(sunday(), " morning ", " jardim ")
        .unwrap();
    let trimmed = service
        .list_registered_child_ids(sunday(), "morning", "jardim")
        .unwrap();

    assert_eq!(padded.into_iter().collect::<Vec<_>>(), vec![a]);
    assert_eq!(trimmed.into_iter().collect::<Vec<_>>(), vec![a]);
    assert_eq!(count(&conn, "services"), 1);
}

#[test]
fn failed_batch_write_leaves_no_rows_behind() {
    let conn = open_db_in_memory().unwrap();
    let known = add_child(&conn, "Ana");
    let unknown = Uuid::new_v4();
    let service = attendance(&conn);

    let err = service
        .register_attendance(&request("jardim", vec![known, unknown]))
        .unwrap_err();

    assert!(matches!(
        err,
        AttendanceError::Persistence {
            operation: "register_attendance",
            ..
        }
    ));
    assert_eq!(err.user_message(), "Erro ao registrar presença");
    assert_eq!(count(&conn, "attendance"), 0);
    assert!(service
        .list_registered_child_ids(sunday(), "morning", "jardim")
        .unwrap()
        .is_empty());
}

#[test]
fn removing_attendance_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let service = attendance(&conn);
    service.register_attendance(&request("jardim", vec![a])).unwrap();
    let month = service.attendance_for_month(2024, 3).unwrap();
    let id = month[0].record.id;

    service.remove_attendance(id).unwrap();
    service.remove_attendance(id).unwrap();
    service.remove_attendance(Uuid::new_v4()).unwrap();

    assert_eq!(count(&conn, "attendance"), 0);
    assert!(service
        .list_registered_child_ids(sunday(), "morning", "jardim")
        .unwrap()
        .is_empty());
}

#[test]
fn duplicate_service_rows_from_interleaved_creation_are_tolerated() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);
    let first = service.resolve_service(sunday(), "morning").unwrap();

    // A second writer that missed the first insert.
    conn.execute(
        "INSERT INTO services (id, service_date, time_slot) VALUES (?1, ?2, 'morning');",
        rusqlite::params![Uuid::new_v4().to_string(), sunday()],
    )
    .unwrap();

    assert_eq!(count(&conn, "services"), 2);
    assert_eq!(service.resolve_service(sunday(), "morning").unwrap(), first);
    assert_eq!(service.resolve_service(sunday(), "morning").unwrap(), first);
}

#[test]
fn month_report_enriches_rows_and_ignores_other_months() {
    let conn = open_db_in_memory().unwrap();
    let ana = add_child(&conn, "Ana");
    let bento = add_child(&conn, "Bento");
    let service = attendance(&conn);

    let mut feb = request("jardim", vec![ana]);
    feb.service_date = date(2024, 2, 4);
    service.register_attendance(&feb).unwrap();

    let mut feb_evening = request("maternal", vec![bento]);
    feb_evening.service_date = date(2024, 2, 29);
    feb_evening.time_slot = "evening".to_string();
    service.register_attendance(&feb_evening).unwrap();

    let mut january = request("jardim", vec![bento]);
    january.service_date = date(2024, 1, 31);
    service.register_attendance(&january).unwrap();

    let mut march = request("jardim", vec![bento]);
    march.service_date = date(2024, 3, 1);
    service.register_attendance(&march).unwrap();

    let entries = service.attendance_for_month(2024, 2).unwrap();

    assert_eq!(entries.len(), 2);
    let ana_entry = entries
        .iter()
        .find(|entry| entry.display_name == "Ana")
        .unwrap();
    assert_eq!(ana_entry.service_date, date(2024, 2, 4));
    assert_eq!(ana_entry.time_slot, "morning");
    assert_eq!(ana_entry.classroom(), "jardim");
    let bento_entry = entries
        .iter()
        .find(|entry| entry.display_name == "Bento")
        .unwrap();
    assert_eq!(bento_entry.service_date, date(2024, 2, 29));
    assert_eq!(bento_entry.time_slot, "evening");
}

#[test]
fn month_without_services_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = attendance(&conn);

    assert!(service.attendance_for_month(2023, 12).unwrap().is_empty());
}

#[test]
fn month_report_keeps_inactive_children_and_names_missing_ones() {
    let conn = open_db_in_memory().unwrap();
    let ana = add_child(&conn, "Ana");
    let service = attendance(&conn);
    service.register_attendance(&request("jardim", vec![ana])).unwrap();

    ChildService::new(SqliteChildRepository::try_new(&conn).unwrap())
        .deactivate_child(ana)
        .unwrap();

    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    service
        .register_attendance(&request("primario", vec![Uuid::new_v4()]))
        .unwrap();

    let mut names: Vec<String> = service
        .attendance_for_month(2024, 3)
        .unwrap()
        .into_iter()
        .map(|entry| entry.display_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ana".to_string(), UNKNOWN_CHILD_NAME.to_string()]);
}

#[test]
fn repository_filter_limits_lookup_to_candidates() {
    let conn = open_db_in_memory().unwrap();
    let a = add_child(&conn, "Ana");
    let b = add_child(&conn, "Bento");
    let service = attendance(&conn);
    let service_id = service.resolve_service(sunday(), "morning").unwrap();
    service.register_attendance(&request("jardim", vec![a, b])).unwrap();

    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();
    let only_a = repo
        .registered_child_ids(service_id, "jardim", Some([a].as_slice()))
        .unwrap();
    assert_eq!(only_a.into_iter().collect::<Vec<_>>(), vec![a]);
    let nobody: &[ChildId] = &[];
    assert!(repo
        .registered_child_ids(service_id, "jardim", Some(nobody))
        .unwrap()
        .is_empty());
}

#[test]
fn invalid_month_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let err = attendance(&conn).attendance_for_month(2024, 13).unwrap_err();
    assert_eq!(err.user_message(), "Mês inválido");
}
