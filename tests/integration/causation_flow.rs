use std::sync::Arc;

use fieldledger_app_lib::db::DbPool;
use fieldledger_app_lib::models::causation::{CausationChainFilter, TriggerKind};
use fieldledger_app_lib::models::cost_code::{BaselineSetInput, CostCodeCreateInput};
use fieldledger_app_lib::models::daily_log::{
    ChangeEntryInput, ConflictEntryInput, DailyLogSaveInput, ManpowerEntryInput,
    WorkPerformedItemInput,
};
use fieldledger_app_lib::models::delay::DelayEventCreateInput;
use fieldledger_app_lib::models::notice::NoticeCreateInput;
use fieldledger_app_lib::services::causation_service::CausationService;
use fieldledger_app_lib::services::cost_code_service::CostCodeService;
use fieldledger_app_lib::services::daily_log_service::DailyLogService;
use fieldledger_app_lib::services::delay_event_service::DelayEventService;
use fieldledger_app_lib::services::derivation_service::DerivationService;
use fieldledger_app_lib::services::notice_service::NoticeService;
use fieldledger_app_lib::services::settings_service::SettingsService;
use tempfile::tempdir;

const PROJECT: &str = "proj-causation";

struct Harness {
    cost_codes: CostCodeService,
    daily_logs: DailyLogService,
    delay_events: DelayEventService,
    notices: NoticeService,
    derivation: DerivationService,
    causation: CausationService,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("causation.sqlite")).expect("db pool");
    let settings = Arc::new(SettingsService::new(pool.clone()));
    Harness {
        cost_codes: CostCodeService::new(pool.clone()),
        daily_logs: DailyLogService::new(pool.clone()),
        delay_events: DelayEventService::new(pool.clone()),
        notices: NoticeService::new(pool.clone()),
        derivation: DerivationService::new(pool.clone()),
        causation: CausationService::new(pool.clone(), settings),
        _dir: dir,
    }
}

/// Seeds a baselined cost code producing 10 u/h before 2024-03-01 and
/// 6 u/h from then on: a measurable 40% productivity loss.
fn seed_production(harness: &Harness) {
    let cost_code = harness
        .cost_codes
        .create_cost_code(CostCodeCreateInput {
            project_id: PROJECT.to_string(),
            code: "03-3000".to_string(),
            csi_division: Some("03".to_string()),
            description: "Cast-in-place concrete".to_string(),
            budgeted_quantity: Some(2000.0),
            unit_of_measure: "sf".to_string(),
        })
        .expect("create cost code")
        .id;
    harness
        .cost_codes
        .set_baseline(BaselineSetInput {
            cost_code_id: cost_code.clone(),
            baseline_unit_rate: 10.0,
        })
        .expect("set baseline");

    for (date, quantity) in [
        ("2024-02-26", 100.0),
        ("2024-02-28", 100.0),
        ("2024-03-01", 60.0),
        ("2024-03-04", 60.0),
    ] {
        let log = harness
            .daily_logs
            .save_daily_log(DailyLogSaveInput {
                project_id: PROJECT.to_string(),
                log_date: date.to_string(),
                status: Some("submitted".to_string()),
                work_performed: vec![WorkPerformedItemInput {
                    cost_code_id: Some(cost_code.clone()),
                    description: "Daily production".to_string(),
                    quantity: Some(quantity),
                    unit_of_measure: Some("sf".to_string()),
                }],
                manpower: vec![ManpowerEntryInput {
                    cost_code_id: Some(cost_code.clone()),
                    trade: "Laborer".to_string(),
                    workers: 1,
                    hours_each: 10.0,
                }],
                ..Default::default()
            })
            .expect("save production log");
        harness
            .derivation
            .derive_from_daily_log(PROJECT, &log.id)
            .expect("derive entries");
    }
}

#[test]
fn undocumented_delay_scores_trigger_only() {
    let harness = harness();

    // No logs, no notices, no cost impact, no productivity record at all.
    harness
        .delay_events
        .create_delay_event(DelayEventCreateInput {
            project_id: PROJECT.to_string(),
            event_date: "2024-03-01".to_string(),
            description: "Owner-directed suspension".to_string(),
            ..Default::default()
        })
        .expect("create delay");

    let chains = harness
        .causation
        .list_causation_chains(PROJECT, CausationChainFilter::All)
        .expect("chains");

    assert_eq!(chains.len(), 1);
    let chain = &chains[0];
    assert_eq!(chain.completeness_score, 1);
    assert_eq!(chain.kind, TriggerKind::DelayEvent);
    assert!(chain.related_logs.is_empty());
    assert!(chain.notices.is_empty());
    assert!(chain.productivity_impact.is_none());
    assert_eq!(chain.estimated_cost_impact, 0.0);
}

#[test]
fn fully_documented_delay_builds_a_five_step_chain() {
    let harness = harness();
    seed_production(&harness);

    let delay = harness
        .delay_events
        .create_delay_event(DelayEventCreateInput {
            project_id: PROJECT.to_string(),
            event_date: "2024-03-01".to_string(),
            description: "Differing site condition at footing F-4".to_string(),
            responsible_party: Some("Owner".to_string()),
            delay_hours: Some(16.0),
            cost_impact: Some(12500.0),
            ..Default::default()
        })
        .expect("create delay");

    // Documentation: a daily log referencing the delay.
    harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            notes: Some("Crews idle pending footing redesign".to_string()),
            delay_event_ids: vec![delay.id.clone()],
            ..Default::default()
        })
        .expect("save documentation log");

    // Notice: references the delay by id.
    harness
        .notices
        .create_notice(NoticeCreateInput {
            project_id: PROJECT.to_string(),
            notice_type: "delay_notice".to_string(),
            subject: Some("Notice of delay - footing F-4".to_string()),
            date_sent: "2024-03-02".to_string(),
            related_delay_event_ids: vec![delay.id.clone()],
            ..Default::default()
        })
        .expect("create notice");

    let chains = harness
        .causation
        .list_causation_chains(PROJECT, CausationChainFilter::All)
        .expect("chains");
    assert_eq!(chains.len(), 1);

    let chain = &chains[0];
    assert_eq!(chain.completeness_score, 5);
    assert_eq!(chain.trigger_id, delay.id);
    assert_eq!(chain.related_logs.len(), 1);
    assert_eq!(chain.notices.len(), 1);
    assert_eq!(chain.estimated_cost_impact, 12500.0);

    let impact = chain.productivity_impact.as_ref().expect("impact");
    assert_eq!(impact.split_date, "2024-03-01");
    assert_eq!(impact.before_average_rate, 10.0);
    assert_eq!(impact.after_average_rate, 6.0);
    assert_eq!(impact.productivity_loss_pct, 40.0);
}

#[test]
fn chains_cover_changes_and_conflicts_and_sort_by_strength() {
    let harness = harness();
    seed_production(&harness);

    let delay = harness
        .delay_events
        .create_delay_event(DelayEventCreateInput {
            project_id: PROJECT.to_string(),
            event_date: "2024-03-01".to_string(),
            description: "Differing site condition at footing F-4".to_string(),
            cost_impact: Some(12500.0),
            ..Default::default()
        })
        .expect("create delay");
    harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-01".to_string(),
            status: Some("submitted".to_string()),
            delay_event_ids: vec![delay.id.clone()],
            ..Default::default()
        })
        .expect("save delay documentation");
    harness
        .notices
        .create_notice(NoticeCreateInput {
            project_id: PROJECT.to_string(),
            notice_type: "delay_notice".to_string(),
            date_sent: "2024-03-02".to_string(),
            related_delay_event_ids: vec![delay.id.clone()],
            ..Default::default()
        })
        .expect("delay notice");

    // A change order and a trade conflict embedded in the 03-02 log. The
    // conflict has schedule impact but no recorded damages.
    let change_log = harness
        .daily_logs
        .save_daily_log(DailyLogSaveInput {
            project_id: PROJECT.to_string(),
            log_date: "2024-03-02".to_string(),
            status: Some("submitted".to_string()),
            changes: vec![ChangeEntryInput {
                description: "Added rebar per RFI 14".to_string(),
                initiated_by: Some("Owner".to_string()),
                schedule_impact_days: Some(2.0),
                estimated_cost_impact: Some(8000.0),
            }],
            conflicts: vec![ConflictEntryInput {
                description: "Ductwork clash at grid B".to_string(),
                trades_involved: Some("HVAC / Plumbing".to_string()),
                schedule_impact_days: Some(1.0),
                estimated_cost_impact: None,
            }],
            ..Default::default()
        })
        .expect("save change log");

    let change_id = change_log.changes[0].id.clone();
    harness
        .notices
        .create_notice(NoticeCreateInput {
            project_id: PROJECT.to_string(),
            notice_type: "change_notice".to_string(),
            date_sent: "2024-03-03".to_string(),
            related_change_ids: vec![change_id.clone()],
            ..Default::default()
        })
        .expect("change notice");

    let chains = harness
        .causation
        .list_causation_chains(PROJECT, CausationChainFilter::All)
        .expect("chains");
    assert_eq!(chains.len(), 3);

    // Two five-step chains first, most recent on top; then the conflict
    // missing its notice and damages.
    assert_eq!(chains[0].kind, TriggerKind::ChangeOrder);
    assert_eq!(chains[0].completeness_score, 5);
    assert_eq!(chains[1].kind, TriggerKind::DelayEvent);
    assert_eq!(chains[1].completeness_score, 5);
    assert_eq!(chains[2].kind, TriggerKind::Conflict);
    assert_eq!(chains[2].completeness_score, 3);

    let conflict_chain = &chains[2];
    assert_eq!(conflict_chain.related_logs.len(), 1);
    assert!(conflict_chain.notices.is_empty());
    assert!(conflict_chain.productivity_impact.is_some());
    assert_eq!(conflict_chain.estimated_cost_impact, 0.0);

    let with_notices = harness
        .causation
        .list_causation_chains(PROJECT, CausationChainFilter::HasNotices)
        .expect("filtered chains");
    assert_eq!(with_notices.len(), 2);

    let missing_notices = harness
        .causation
        .list_causation_chains(PROJECT, CausationChainFilter::MissingNotices)
        .expect("filtered chains");
    assert_eq!(missing_notices.len(), 1);
    assert_eq!(missing_notices[0].kind, TriggerKind::Conflict);
}
