use std::sync::Arc;

use fieldledger_app_lib::db::DbPool;
use fieldledger_app_lib::models::cost_code::{BaselineSetInput, CostCodeCreateInput};
use fieldledger_app_lib::models::daily_log::{
    DailyLogSaveInput, ManpowerEntryInput, WorkPerformedItemInput,
};
use fieldledger_app_lib::models::summary::TrendDirection;
use fieldledger_app_lib::services::analytics_service::AnalyticsService;
use fieldledger_app_lib::services::cost_code_service::CostCodeService;
use fieldledger_app_lib::services::daily_log_service::DailyLogService;
use fieldledger_app_lib::services::derivation_service::DerivationService;
use fieldledger_app_lib::services::settings_service::SettingsService;
use fieldledger_app_lib::services::summary_service::SummaryService;
use tempfile::tempdir;

const PROJECT: &str = "proj-analytics";

struct Harness {
    cost_codes: CostCodeService,
    daily_logs: DailyLogService,
    derivation: DerivationService,
    analytics: AnalyticsService,
    summary: SummaryService,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("analytics.sqlite")).expect("db pool");
    let settings = Arc::new(SettingsService::new(pool.clone()));
    Harness {
        cost_codes: CostCodeService::new(pool.clone()),
        daily_logs: DailyLogService::new(pool.clone()),
        derivation: DerivationService::new(pool.clone()),
        analytics: AnalyticsService::new(pool.clone(), Arc::clone(&settings)),
        summary: SummaryService::new(pool.clone(), settings),
        _dir: dir,
    }
}

fn create_cost_code(harness: &Harness, code: &str, budgeted_quantity: f64) -> String {
    harness
        .cost_codes
        .create_cost_code(CostCodeCreateInput {
            project_id: PROJECT.to_string(),
            code: code.to_string(),
            csi_division: Some("03".to_string()),
            description: format!("Activity {code}"),
            budgeted_quantity: Some(budgeted_quantity),
            unit_of_measure: "sf".to_string(),
        })
        .expect("create cost code")
        .id
}

/// Saves a submitted one-line log and derives its productivity entry:
/// `quantity` units against `hours` crew hours on `date`.
fn log_production(harness: &Harness, cost_code_id: &str, date: &str, quantity: f64, hours: f64) -> String {
    let log = harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: date.to_string(),
            status: Some("submitted".to_string()),
            work_performed: vec![WorkPerformedItemInput {
                cost_code_id: Some(cost_code_id.to_string()),
                description: "Daily production".to_string(),
                quantity: Some(quantity),
                unit_of_measure: Some("sf".to_string()),
            }],
            manpower: vec![ManpowerEntryInput {
                cost_code_id: Some(cost_code_id.to_string()),
                trade: "Laborer".to_string(),
                workers: 1,
                hours_each: hours,
            }],
            ..Default::default()
        })
        .expect("save daily log");
    harness
        .derivation
        .derive_from_daily_log(PROJECT, &log.id)
        .expect("derive entries");
    log.id
}

#[test]
fn recompute_aggregates_per_cost_code_against_the_baseline() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000", 400.0);
    let steel = create_cost_code(&harness, "05-1000", 100.0);
    harness
        .cost_codes
        .set_baseline(BaselineSetInput {
            cost_code_id: concrete.clone(),
            baseline_unit_rate: 10.0,
        })
        .expect("set baseline");

    // Concrete runs at 8 then 12 units/hour; steel has no baseline.
    log_production(&harness, &concrete, "2024-03-01", 80.0, 10.0);
    log_production(&harness, &concrete, "2024-03-04", 120.0, 10.0);
    log_production(&harness, &steel, "2024-03-02", 50.0, 10.0);

    let outcome = harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("recompute");
    assert_eq!(outcome.cost_codes_updated, 2);
    assert_eq!(outcome.entries_considered, 3);

    let records = harness.analytics.list_analytics(PROJECT).expect("list");
    let concrete_stats = records
        .iter()
        .find(|record| record.cost_code_id == concrete)
        .expect("concrete analytics");
    assert_eq!(concrete_stats.average_unit_rate, 10.0);
    assert_eq!(concrete_stats.peak_unit_rate, 12.0);
    assert_eq!(concrete_stats.low_unit_rate, 8.0);
    assert!((concrete_stats.standard_deviation - 8.0_f64.sqrt()).abs() < 1e-9);
    assert_eq!(concrete_stats.total_labor_hours, 20.0);
    assert_eq!(concrete_stats.total_quantity, 200.0);
    assert_eq!(concrete_stats.period_end, "2024-03-04");
    // Exactly on baseline: no cost or schedule variance.
    assert_eq!(concrete_stats.cost_variance, Some(0.0));
    assert_eq!(concrete_stats.schedule_variance_days, Some(0.0));
    assert_eq!(concrete_stats.planned_vs_actual_variance, Some(0.0));

    let steel_stats = records
        .iter()
        .find(|record| record.cost_code_id == steel)
        .expect("steel analytics");
    assert_eq!(steel_stats.average_unit_rate, 5.0);
    assert!(steel_stats.cost_variance.is_none());
    assert!(steel_stats.schedule_variance_days.is_none());
    assert!(steel_stats.planned_vs_actual_variance.is_none());
}

#[test]
fn recompute_is_idempotent_with_no_new_entries() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000", 400.0);
    harness
        .cost_codes
        .set_baseline(BaselineSetInput {
            cost_code_id: concrete.clone(),
            baseline_unit_rate: 10.0,
        })
        .expect("set baseline");
    log_production(&harness, &concrete, "2024-03-01", 80.0, 10.0);
    log_production(&harness, &concrete, "2024-03-04", 120.0, 10.0);

    harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("first recompute");
    let first = harness.analytics.list_analytics(PROJECT).expect("list");

    harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("second recompute");
    let second = harness.analytics.list_analytics(PROJECT).expect("list");

    assert_eq!(first, second);
}

#[test]
fn recompute_clears_analytics_for_cost_codes_without_entries() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000", 400.0);
    let log_id = log_production(&harness, &concrete, "2024-03-01", 80.0, 10.0);

    harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("recompute");
    assert_eq!(harness.analytics.list_analytics(PROJECT).expect("list").len(), 1);

    // The corrected log no longer reports any production; its entries go
    // away on re-derivation and the stale analytics row follows.
    harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            id: Some(log_id.clone()),
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            ..Default::default()
        })
        .expect("resave log");
    harness
        .derivation
        .derive_from_daily_log(PROJECT, &log_id)
        .expect("rederive");

    let outcome = harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("recompute again");
    assert_eq!(outcome.cost_codes_updated, 0);
    assert_eq!(outcome.cost_codes_cleared, 1);
    assert!(harness.analytics.list_analytics(PROJECT).expect("list").is_empty());
}

#[test]
fn summary_joins_registry_baseline_and_analytics() {
    let harness = harness();
    let concrete = create_cost_code(&harness, "03-3000", 400.0);
    let steel = create_cost_code(&harness, "05-1000", 100.0);
    let masonry = create_cost_code(&harness, "04-2000", 500.0);
    for (cost_code_id, rate) in [(&concrete, 10.0), (&masonry, 10.0)] {
        harness
            .cost_codes
            .set_baseline(BaselineSetInput {
                cost_code_id: cost_code_id.to_string(),
                baseline_unit_rate: rate,
            })
            .expect("set baseline");
    }

    log_production(&harness, &concrete, "2024-03-01", 80.0, 10.0);
    log_production(&harness, &concrete, "2024-03-04", 120.0, 10.0);
    log_production(&harness, &steel, "2024-03-02", 50.0, 10.0);
    // Masonry limps along at half its baseline with most work remaining.
    log_production(&harness, &masonry, "2024-03-03", 50.0, 10.0);

    harness
        .analytics
        .recompute_analytics(PROJECT)
        .expect("recompute");
    let summary = harness
        .summary
        .get_productivity_summary(PROJECT)
        .expect("summary");

    assert_eq!(summary.cost_codes.len(), 3);

    let concrete_summary = summary
        .cost_codes
        .iter()
        .find(|row| row.cost_code.id == concrete)
        .expect("concrete summary");
    assert_eq!(concrete_summary.current_unit_rate, 10.0);
    assert_eq!(concrete_summary.productivity_index, Some(1.0));
    assert_eq!(concrete_summary.trend_direction, TrendDirection::Stable);
    assert_eq!(concrete_summary.percent_complete, 50.0);
    assert!(!concrete_summary.is_at_risk);
    assert_eq!(concrete_summary.days_behind, 0.0);

    let steel_summary = summary
        .cost_codes
        .iter()
        .find(|row| row.cost_code.id == steel)
        .expect("steel summary");
    assert!(steel_summary.productivity_index.is_none());
    assert!(!steel_summary.is_at_risk);

    let masonry_summary = summary
        .cost_codes
        .iter()
        .find(|row| row.cost_code.id == masonry)
        .expect("masonry summary");
    assert_eq!(masonry_summary.productivity_index, Some(0.5));
    assert!(masonry_summary.is_at_risk);
    // 450 units remaining: 90 hours at 5 u/h vs 45 planned, 45 hours
    // behind at 8 crew hours per day.
    assert!((masonry_summary.days_behind - 5.6).abs() < 1e-9);

    // Portfolio rollup averages the two baselined codes.
    assert_eq!(summary.overall_productivity_index, Some(0.75));
    assert_eq!(summary.at_risk_count, 1);
}
