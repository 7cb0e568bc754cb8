use chrono::NaiveDate;
use okr_core::db::open_db_in_memory;
use okr_core::{
    DepartmentId, NewProject, OrgRepository, ProjectRepository, ProjectId, RepoError,
    ScheduleInput, ScheduleValidationError, SqliteOrgRepository, SqliteProjectRepository,
    TimelineConfig, TimelineService, MIN_BAR_WIDTH_PERCENT,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn department(conn: &Connection, name: &str) -> DepartmentId {
    SqliteOrgRepository::try_new(conn)
        .unwrap()
        .create_department(name)
        .unwrap()
        .uuid
}

fn project(
    repo: &SqliteProjectRepository<'_>,
    department_uuid: DepartmentId,
    name: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ProjectId {
    repo.create_project(&NewProject {
        department_uuid,
        schedule: ScheduleInput::new(name).with_dates(start, end),
        ..NewProject::default()
    })
    .unwrap()
    .uuid
}

#[test]
fn empty_department_shows_default_window() {
    let conn = open_db_in_memory().unwrap();
    let dept = department(&conn, "Empty");
    let service = TimelineService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        TimelineConfig::default(),
    );

    let view = service.build(Some(dept), date(2025, 3, 14)).unwrap();
    assert!(view.rows.is_empty());
    assert_eq!(view.range.start, date(2025, 2, 1));
    assert_eq!(view.range.end, date(2025, 9, 30));
    assert_eq!(view.range.months.len(), 8);
    assert_eq!(view.range.months[0].label, "Feb '25");
    assert!(view.today_marker.is_some());
}

#[test]
fn window_expands_to_cover_projects_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let dept = department(&conn, "Platform");
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let migration = project(
        &repo,
        dept,
        "Database migration",
        Some(date(2024, 11, 10)),
        Some(date(2025, 4, 20)),
    );
    repo.create_task(
        migration,
        &ScheduleInput::new("Cutover").with_dates(Some(date(2025, 1, 5)), Some(date(2025, 12, 2))),
    )
    .unwrap();
    repo.create_task(migration, &ScheduleInput::new("Unscheduled"))
        .unwrap();
    project(&repo, dept, "Someday", None, None);

    let today = date(2025, 3, 14);
    let view = TimelineService::new(repo, TimelineConfig::default())
        .build(Some(dept), today)
        .unwrap();

    assert_eq!(view.range.start, date(2024, 11, 1));
    assert_eq!(view.range.end, date(2025, 12, 31));
    assert_eq!(view.range.months.len(), 14);
    assert_eq!(view.range.months[13].label, "Dec '25");

    let total_days = (view.range.end - view.range.start).num_days() as f64;
    let expected_marker = (today - view.range.start).num_days() as f64 / total_days * 100.0;
    let marker = view.today_marker.unwrap();
    assert!((marker - expected_marker).abs() < 1e-9);

    assert_eq!(view.rows.len(), 2);
    let first = &view.rows[0];
    assert_eq!(first.label, "Database migration");
    let bar = first.bar.unwrap();
    assert!((bar.left_percent - 9.0 / total_days * 100.0).abs() < 1e-9);
    assert!(bar.left_percent + bar.width_percent <= 100.0);

    assert_eq!(first.children.len(), 2);
    assert!(first.children[0].bar.is_some());
    assert!(first.children[1].bar.is_none());

    let someday = &view.rows[1];
    assert_eq!(someday.label, "Someday");
    assert!(someday.bar.is_none());
}

#[test]
fn same_day_span_keeps_minimum_width() {
    let conn = open_db_in_memory().unwrap();
    let dept = department(&conn, "Launch");
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    project(
        &repo,
        dept,
        "Launch day",
        Some(date(2025, 3, 20)),
        Some(date(2025, 3, 20)),
    );

    let view = TimelineService::new(repo, TimelineConfig::default())
        .build(Some(dept), date(2025, 3, 14))
        .unwrap();
    let bar = view.rows[0].bar.unwrap();
    assert!(bar.width_percent >= MIN_BAR_WIDTH_PERCENT);
}

#[test]
fn department_filter_limits_rows_and_window() {
    let conn = open_db_in_memory().unwrap();
    let near = department(&conn, "Near");
    let far = department(&conn, "Far");
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    project(
        &repo,
        near,
        "Quarter goal",
        Some(date(2025, 3, 1)),
        Some(date(2025, 5, 31)),
    );
    project(
        &repo,
        far,
        "Moonshot",
        Some(date(2025, 6, 1)),
        Some(date(2027, 2, 14)),
    );
    let service = TimelineService::new(repo, TimelineConfig::default());
    let today = date(2025, 3, 14);

    let filtered = service.build(Some(near), today).unwrap();
    assert_eq!(filtered.rows.len(), 1);
    assert_eq!(filtered.range.end, date(2025, 9, 30));

    let everything = service.build(None, today).unwrap();
    assert_eq!(everything.rows.len(), 2);
    assert_eq!(everything.range.end, date(2027, 2, 28));
}

#[test]
fn custom_window_config_is_respected() {
    let conn = open_db_in_memory().unwrap();
    let dept = department(&conn, "Config");
    let service = TimelineService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        TimelineConfig {
            lookback_months: 0,
            lookahead_months: 2,
        },
    );

    let view = service.build(Some(dept), date(2025, 11, 3)).unwrap();
    assert_eq!(view.range.start, date(2025, 11, 1));
    assert_eq!(view.range.end, date(2026, 1, 31));
    let labels: Vec<&str> = view
        .range
        .months
        .iter()
        .map(|month| month.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Nov '25", "Dec '25", "Jan '26"]);
}

#[test]
fn schedule_inputs_are_validated_on_create() {
    let conn = open_db_in_memory().unwrap();
    let dept = department(&conn, "Validation");
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let err = repo
        .create_project(&NewProject {
            department_uuid: dept,
            schedule: ScheduleInput::new("Backwards")
                .with_dates(Some(date(2025, 5, 1)), Some(date(2025, 4, 1))),
            ..NewProject::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ScheduleValidation(ScheduleValidationError::EndBeforeStart { .. })
    ));

    let err = repo
        .create_project(&NewProject {
            department_uuid: dept,
            schedule: ScheduleInput::new("  "),
            ..NewProject::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ScheduleValidation(ScheduleValidationError::BlankName)
    ));

    let missing = Uuid::new_v4();
    let err = repo
        .create_task(missing, &ScheduleInput::new("Lost"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == missing));

    assert!(repo.list_projects(dept).unwrap().is_empty());
}

#[test]
fn project_keeps_owner_and_objective_link() {
    let conn = open_db_in_memory().unwrap();
    let org = SqliteOrgRepository::try_new(&conn).unwrap();
    let dept = org.create_department("Revenue").unwrap();
    let objective = org.create_objective(dept.uuid, "Grow ARR").unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let created = repo
        .create_project(&NewProject {
            department_uuid: dept.uuid,
            objective_uuid: Some(objective.uuid),
            dri: Some("Sam".to_string()),
            schedule: ScheduleInput::new(" Pricing page "),
        })
        .unwrap();

    let loaded = repo.get_project(created.uuid).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Pricing page");
    assert_eq!(loaded.objective_uuid, Some(objective.uuid));
    assert_eq!(loaded.dri.as_deref(), Some("Sam"));
}
