use okr_core::db::open_db_in_memory;
use okr_core::{
    Direction, FormatConfig, KeyResult, KeyResultService, KeyResultValidationError,
    ObjectiveId, OrgRepository, RepoError, SqliteKeyResultRepository, SqliteOrgRepository,
    UnitType,
};
use rusqlite::Connection;
use uuid::Uuid;

struct Fixture {
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    fn org(&self) -> SqliteOrgRepository<'_> {
        SqliteOrgRepository::try_new(&self.conn).unwrap()
    }

    fn service(&self) -> KeyResultService<SqliteKeyResultRepository<'_>> {
        KeyResultService::new(
            SqliteKeyResultRepository::try_new(&self.conn).unwrap(),
            FormatConfig::default(),
        )
    }

    fn objective(&self, department: &str, title: &str) -> ObjectiveId {
        let org = self.org();
        let department = org.create_department(department).unwrap();
        org.create_objective(department.uuid, title).unwrap().uuid
    }
}

#[test]
fn create_then_read_view_with_derived_progress() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Sales", "Grow revenue");
    let service = fixture.service();

    let mut key_result = KeyResult::new(objective, "  Annual recurring revenue ", 100.0);
    key_result.current_value = 55.0;
    key_result.baseline_value = Some(10.0);
    let id = service.create_key_result(&key_result).unwrap();

    let view = service.key_result_view(id).unwrap();
    assert_eq!(view.progress, 50);
    assert_eq!(view.key_result.title, "Annual recurring revenue");
    assert_eq!(view.current_display, "55");
    assert_eq!(view.target_display, "100");
    assert_eq!(view.baseline_display, "10");
}

#[test]
fn decrease_direction_reaching_target_is_complete() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Support", "Faster responses");
    let service = fixture.service();

    let mut key_result = KeyResult::new(objective, "Median response hours", 5.0);
    key_result.direction = Direction::Decrease;
    key_result.baseline_value = Some(30.0);
    key_result.current_value = 5.0;
    let id = service.create_key_result(&key_result).unwrap();

    assert_eq!(service.key_result_view(id).unwrap().progress, 100);

    let view = service.record_current_value(id, 17.5).unwrap();
    assert_eq!(view.progress, 50);
    assert_eq!(view.key_result.current_value, 17.5);
}

#[test]
fn record_current_value_persists_and_reformats() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Finance", "Fund the roadmap");
    let service = fixture.service();

    let mut key_result = KeyResult::new(objective, "Monthly revenue", 50_000.0);
    key_result.unit_type = UnitType::Currency;
    key_result.value_label = Some("MRR".to_string());
    let id = service.create_key_result(&key_result).unwrap();

    let view = service.record_current_value(id, 12_500.0).unwrap();
    assert_eq!(view.progress, 25);
    assert_eq!(view.current_display, "$12,500 MRR");
    assert_eq!(view.target_display, "$50,000 MRR");
    assert_eq!(view.baseline_display, "–");

    let reread = service.key_result_view(id).unwrap();
    assert_eq!(reread, view);
}

#[test]
fn update_rewrites_definition() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Ops", "Reliable platform");
    let service = fixture.service();

    let key_result = KeyResult::new(objective, "Uptime", 99.9);
    let id = service.create_key_result(&key_result).unwrap();

    let mut edited = key_result.clone();
    edited.unit_type = UnitType::Percentage;
    edited.current_value = 99.95;
    edited.target_value = 99.99;
    edited.value_label = Some("uptime".to_string());
    service.update_key_result(&edited).unwrap();

    let view = service.key_result_view(id).unwrap();
    assert_eq!(view.key_result.unit_type, UnitType::Percentage);
    assert_eq!(view.current_display, "99.95% uptime");
    assert_eq!(view.target_display, "99.99% uptime");
}

#[test]
fn missing_records_are_not_found() {
    let fixture = Fixture::new();
    let service = fixture.service();
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.key_result_view(missing).unwrap_err(),
        RepoError::NotFound { id, .. } if id == missing
    ));
    assert!(matches!(
        service.record_current_value(missing, 1.0).unwrap_err(),
        RepoError::NotFound { .. }
    ));
    assert!(matches!(
        service.set_top_key_result(missing).unwrap_err(),
        RepoError::NotFound { .. }
    ));

    let orphan = KeyResult::new(Uuid::new_v4(), "Orphan", 1.0);
    assert!(matches!(
        service.create_key_result(&orphan).unwrap_err(),
        RepoError::NotFound { entity: "objective", .. }
    ));
    assert!(matches!(
        service.update_key_result(&orphan).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn invalid_definitions_are_rejected() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Sales", "Grow");
    let service = fixture.service();

    let blank = KeyResult::new(objective, "   ", 10.0);
    assert!(matches!(
        service.create_key_result(&blank).unwrap_err(),
        RepoError::KeyResultValidation(KeyResultValidationError::BlankTitle)
    ));

    let mut infinite = KeyResult::new(objective, "Deals", f64::INFINITY);
    assert!(matches!(
        service.create_key_result(&infinite).unwrap_err(),
        RepoError::KeyResultValidation(KeyResultValidationError::NonFiniteValue("target_value"))
    ));

    infinite.target_value = 10.0;
    let id = service.create_key_result(&infinite).unwrap();
    assert!(matches!(
        service.record_current_value(id, f64::NAN).unwrap_err(),
        RepoError::KeyResultValidation(KeyResultValidationError::NonFiniteValue("current_value"))
    ));
    assert_eq!(service.key_result_view(id).unwrap().key_result.current_value, 0.0);
}

#[test]
fn objective_progress_is_rounded_mean() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Growth", "Expand");
    let service = fixture.service();

    assert_eq!(service.objective_progress(objective).unwrap(), 0);

    for (title, current) in [("a", 100.0), ("b", 50.0), ("c", 0.0), ("d", 25.0)] {
        let mut key_result = KeyResult::new(objective, title, 100.0);
        key_result.current_value = current;
        service.create_key_result(&key_result).unwrap();
    }

    // (100 + 50 + 0 + 25) / 4 = 43.75
    assert_eq!(service.objective_progress(objective).unwrap(), 44);

    let titles: Vec<String> = service
        .objective_views(objective)
        .unwrap()
        .into_iter()
        .map(|view| view.key_result.title)
        .collect();
    assert_eq!(titles, vec!["a", "b", "c", "d"]);
}

#[test]
fn top_key_result_is_unique_per_department() {
    let fixture = Fixture::new();
    let org = fixture.org();
    let sales = org.create_department("Sales").unwrap();
    let growth = org.create_objective(sales.uuid, "Grow").unwrap();
    let retain = org.create_objective(sales.uuid, "Retain").unwrap();
    let other = fixture.objective("Support", "Help");
    let service = fixture.service();

    let first = service
        .create_key_result(&KeyResult::new(growth.uuid, "New logos", 20.0))
        .unwrap();
    let second = service
        .create_key_result(&KeyResult::new(retain.uuid, "Churn", 2.0))
        .unwrap();
    let elsewhere = service
        .create_key_result(&KeyResult::new(other, "CSAT", 90.0))
        .unwrap();

    assert!(service.top_key_result(sales.uuid).unwrap().is_none());

    assert_eq!(service.set_top_key_result(first).unwrap(), sales.uuid);
    service.set_top_key_result(elsewhere).unwrap();
    assert_eq!(service.set_top_key_result(second).unwrap(), sales.uuid);

    let top = service.top_key_result(sales.uuid).unwrap().unwrap();
    assert_eq!(top.key_result.uuid, second);

    let flagged: Vec<_> = service
        .department_views(sales.uuid)
        .unwrap()
        .into_iter()
        .filter(|view| view.key_result.is_top)
        .collect();
    assert_eq!(flagged.len(), 1);
    assert!(service.key_result_view(elsewhere).unwrap().key_result.is_top);
}

#[test]
fn view_serializes_for_dashboards() {
    let fixture = Fixture::new();
    let objective = fixture.objective("Sales", "Grow");
    let service = fixture.service();

    let mut key_result = KeyResult::new(objective, "Conversion", 40.0);
    key_result.unit_type = UnitType::Percentage;
    key_result.current_value = 10.0;
    let id = service.create_key_result(&key_result).unwrap();

    let json = serde_json::to_value(service.key_result_view(id).unwrap()).unwrap();
    assert_eq!(json["progress"], 25);
    assert_eq!(json["current_display"], "10%");
    assert_eq!(json["key_result"]["direction"], "increase");
    assert_eq!(json["key_result"]["unit_type"], "percentage");
    assert!(json["key_result"]["baseline_value"].is_null());
}
