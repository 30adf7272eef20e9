use fieldledger_app_lib::db::repositories::productivity_repository::ProductivityRepository;
use fieldledger_app_lib::db::DbPool;
use fieldledger_app_lib::models::cost_code::CostCodeCreateInput;
use fieldledger_app_lib::models::daily_log::{
    DailyLogSaveInput, ManpowerEntryInput, WorkPerformedItemInput,
};
use fieldledger_app_lib::models::productivity::{EntrySource, ProductivityEntryRecord};
use fieldledger_app_lib::models::time_entry::TimeEntryCreateInput;
use fieldledger_app_lib::services::cost_code_service::CostCodeService;
use fieldledger_app_lib::services::daily_log_service::DailyLogService;
use fieldledger_app_lib::services::derivation_service::DerivationService;
use fieldledger_app_lib::services::time_entry_service::TimeEntryService;
use tempfile::tempdir;

const PROJECT: &str = "proj-derivation";

struct Harness {
    pool: DbPool,
    cost_codes: CostCodeService,
    daily_logs: DailyLogService,
    time_entries: TimeEntryService,
    derivation: DerivationService,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("derivation.sqlite")).expect("db pool");
    Harness {
        cost_codes: CostCodeService::new(pool.clone()),
        daily_logs: DailyLogService::new(pool.clone()),
        time_entries: TimeEntryService::new(pool.clone()),
        derivation: DerivationService::new(pool.clone()),
        pool,
        _dir: dir,
    }
}

fn create_cost_code(harness: &Harness, code: &str) -> String {
    harness
        .cost_codes
        .create_cost_code(CostCodeCreateInput {
            project_id: PROJECT.to_string(),
            code: code.to_string(),
            csi_division: Some("03".to_string()),
            description: format!("Activity {code}"),
            budgeted_quantity: Some(1000.0),
            unit_of_measure: "sf".to_string(),
        })
        .expect("create cost code")
        .id
}

fn work_item(cost_code_id: Option<&str>, quantity: Option<f64>) -> WorkPerformedItemInput {
    WorkPerformedItemInput {
        cost_code_id: cost_code_id.map(|value| value.to_string()),
        description: "Formwork at level 2".to_string(),
        quantity,
        unit_of_measure: Some("sf".to_string()),
    }
}

fn manpower(cost_code_id: Option<&str>, workers: i64, hours_each: f64) -> ManpowerEntryInput {
    ManpowerEntryInput {
        cost_code_id: cost_code_id.map(|value| value.to_string()),
        trade: "Carpenter".to_string(),
        workers,
        hours_each,
    }
}

fn entries(harness: &Harness) -> Vec<ProductivityEntryRecord> {
    harness
        .pool
        .with_connection(|conn| ProductivityRepository::list_entries_by_project(conn, PROJECT))
        .expect("list entries")
}

#[test]
fn daily_log_derivation_computes_rates_and_skips_gaps() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000");
    let steel = create_cost_code(&harness, "05-1000");

    let log = harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![
                work_item(Some(&concrete), Some(80.0)),
                // No reported quantity: skipped, never a zero entry.
                work_item(Some(&steel), None),
                // No cost code: skipped.
                work_item(None, Some(50.0)),
            ],
            manpower: vec![manpower(Some(&concrete), 2, 5.0), manpower(Some(&steel), 1, 8.0)],
            ..Default::default()
        })
        .expect("save daily log");

    let outcome = harness
        .derivation
        .derive_from_daily_log(PROJECT, &log.id)
        .expect("derive from daily log");

    assert_eq!(outcome.derived_entries, 1);
    assert_eq!(outcome.skipped_items, 2);
    assert_eq!(outcome.removed_entries, 0);

    let derived = entries(&harness);
    assert_eq!(derived.len(), 1);
    let entry = &derived[0];
    assert_eq!(entry.cost_code_id, concrete);
    assert_eq!(entry.entry_date, "2024-03-01");
    assert_eq!(entry.quantity, 80.0);
    assert_eq!(entry.labor_hours, 10.0);
    assert_eq!(entry.unit_rate, 8.0);
    assert_eq!(entry.source, EntrySource::DailyLog);
    assert_eq!(entry.source_log_id.as_deref(), Some(log.id.as_str()));
}

#[test]
fn rederiving_an_edited_log_replaces_instead_of_duplicating() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000");

    let log = harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![work_item(Some(&concrete), Some(80.0))],
            manpower: vec![manpower(Some(&concrete), 2, 5.0)],
            ..Default::default()
        })
        .expect("save daily log");
    harness
        .derivation
        .derive_from_daily_log(PROJECT, &log.id)
        .expect("first derivation");

    // Edit the same log: corrected quantity.
    harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            id: Some(log.id.clone()),
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![work_item(Some(&concrete), Some(100.0))],
            manpower: vec![manpower(Some(&concrete), 2, 5.0)],
            ..Default::default()
        })
        .expect("resave daily log");
    let outcome = harness
        .derivation
        .derive_from_daily_log(PROJECT, &log.id)
        .expect("second derivation");

    assert_eq!(outcome.removed_entries, 1);
    assert_eq!(outcome.derived_entries, 1);

    let derived = entries(&harness);
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].quantity, 100.0);
    assert_eq!(derived[0].unit_rate, 10.0);
}

#[test]
fn crew_hours_are_apportioned_by_quantity_share() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000");

    let log = harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-05".to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![
                work_item(Some(&concrete), Some(300.0)),
                work_item(Some(&concrete), Some(100.0)),
            ],
            manpower: vec![manpower(Some(&concrete), 5, 8.0)],
            ..Default::default()
        })
        .expect("save daily log");
    let outcome = harness
        .derivation
        .derive_from_daily_log(PROJECT, &log.id)
        .expect("derive");

    assert_eq!(outcome.derived_entries, 2);

    let mut derived = entries(&harness);
    derived.sort_by(|a, b| b.quantity.partial_cmp(&a.quantity).unwrap());
    assert_eq!(derived[0].labor_hours, 30.0);
    assert_eq!(derived[1].labor_hours, 10.0);
    // Apportioned lines share the code's aggregate rate.
    assert_eq!(derived[0].unit_rate, 10.0);
    assert_eq!(derived[1].unit_rate, 10.0);
}

#[test]
fn time_entry_derivation_joins_quantity_from_submitted_logs() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000");

    for hours in [6.0, 4.0] {
        harness
            .time_entries
            .create_time_entry(TimeEntryCreateInput {
                project_id: PROJECT.to_string(),
                worker_name: "J. Alvarez".to_string(),
                entry_date: "2024-03-02".to_string(),
                cost_code_id: Some(concrete.clone()),
                hours,
            })
            .expect("create time entry");
    }
    let approved = harness
        .time_entries
        .approve_for_date(PROJECT, "2024-03-02")
        .expect("approve");
    assert_eq!(approved, 2);

    // Quantity for the date comes from the submitted daily log.
    harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-02".to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![work_item(Some(&concrete), Some(120.0))],
            ..Default::default()
        })
        .expect("save daily log");

    let outcome = harness
        .derivation
        .derive_from_time_entries(PROJECT, "2024-03-02")
        .expect("derive from time entries");
    assert_eq!(outcome.derived_entries, 1);

    let derived = entries(&harness);
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].labor_hours, 10.0);
    assert_eq!(derived[0].quantity, 120.0);
    assert_eq!(derived[0].unit_rate, 12.0);
    assert_eq!(derived[0].source, EntrySource::TimeEntry);
    assert!(derived[0].source_log_id.is_none());

    // Re-deriving the same date replaces the previous output.
    let outcome = harness
        .derivation
        .derive_from_time_entries(PROJECT, "2024-03-02")
        .expect("rederive");
    assert_eq!(outcome.removed_entries, 1);
    assert_eq!(outcome.derived_entries, 1);
    assert_eq!(entries(&harness).len(), 1);
}

#[test]
fn time_entry_hours_without_logged_quantity_derive_nothing() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000");

    harness
        .time_entries
        .create_time_entry(TimeEntryCreateInput {
            project_id: PROJECT.to_string(),
            worker_name: "M. Chen".to_string(),
            entry_date: "2024-03-08".to_string(),
            cost_code_id: Some(concrete),
            hours: 8.0,
        })
        .expect("create time entry");
    harness
        .time_entries
        .approve_for_date(PROJECT, "2024-03-08")
        .expect("approve");

    let outcome = harness
        .derivation
        .derive_from_time_entries(PROJECT, "2024-03-08")
        .expect("derive");

    assert_eq!(outcome.derived_entries, 0);
    assert_eq!(outcome.skipped_items, 1);
    assert!(entries(&harness).is_empty());
}
