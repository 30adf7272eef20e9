use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::db::repositories::cost_code_repository::CostCodeRepository;
use crate::db::repositories::daily_log_repository::DailyLogRepository;
use crate::db::repositories::delay_event_repository::DelayEventRepository;
use crate::db::repositories::notice_repository::NoticeRepository;
use crate::db::repositories::productivity_repository::ProductivityRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::causation::{
    CausationChain, CausationChainFilter, ProductivityImpact, RelatedLogRef, TriggerEvent,
    TriggerKind,
};
use crate::models::daily_log::{ChangeEntryRecord, ConflictEntryRecord, DailyLogRecord};
use crate::models::delay::DelayEventRecord;
use crate::models::notice::NoticeLogRecord;
use crate::models::productivity::ProductivityEntryRecord;
use crate::services::settings_service::SettingsService;

/// Builds the evidentiary chain for every schedule-impacting event of a
/// project: trigger, documenting logs, notices, measured productivity
/// impact, and recorded damages, scored 1-5 for completeness. Chains are
/// re-derived from current records on every request.
pub struct CausationService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

struct ProjectRecords {
    logs: Vec<DailyLogRecord>,
    notices: Vec<NoticeLogRecord>,
    entries: Vec<ProductivityEntryRecord>,
    has_baselines: bool,
    delays: Vec<DelayEventRecord>,
    changes: Vec<ChangeEntryRecord>,
    conflicts: Vec<ConflictEntryRecord>,
}

impl CausationService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    pub fn list_causation_chains(
        &self,
        project_id: &str,
        filter: CausationChainFilter,
    ) -> AppResult<Vec<CausationChain>> {
        let crew_hours_per_day = self.settings.get()?.crew_hours_per_day;
        let records = self.load_project_records(project_id)?;

        let mut chains: Vec<CausationChain> = Vec::new();
        for delay in &records.delays {
            chains.push(build_delay_chain(delay, &records, crew_hours_per_day));
        }
        for change in records
            .changes
            .iter()
            .filter(|change| has_impact(change.estimated_cost_impact, change.schedule_impact_days))
        {
            chains.push(build_change_chain(change, &records));
        }
        for conflict in records.conflicts.iter().filter(|conflict| {
            has_impact(conflict.estimated_cost_impact, conflict.schedule_impact_days)
        }) {
            chains.push(build_conflict_chain(conflict, &records));
        }

        // Strongest-documented, most recent issues first.
        chains.sort_by(|a, b| {
            b.completeness_score
                .cmp(&a.completeness_score)
                .then_with(|| b.trigger.date.cmp(&a.trigger.date))
        });

        chains.retain(|chain| match filter {
            CausationChainFilter::All => true,
            CausationChainFilter::HasNotices => !chain.notices.is_empty(),
            CausationChainFilter::MissingNotices => chain.notices.is_empty(),
        });

        debug!(
            target: "app::causation",
            project_id,
            chains = chains.len(),
            "causation chains assembled"
        );

        Ok(chains)
    }

    fn load_project_records(&self, project_id: &str) -> AppResult<ProjectRecords> {
        self.db.with_connection(|conn| {
            let logs = DailyLogRepository::list_by_project(conn, project_id)?;
            let notices = NoticeRepository::list_by_project(conn, project_id)?;
            let entries = ProductivityRepository::list_entries_by_project(conn, project_id)?;
            let has_baselines =
                !CostCodeRepository::list_baselines_by_project(conn, project_id)?.is_empty();
            let delays = DelayEventRepository::list_by_project(conn, project_id)?;
            let changes = DailyLogRepository::list_change_entries(conn, project_id)?;
            let conflicts = DailyLogRepository::list_conflict_entries(conn, project_id)?;

            Ok(ProjectRecords {
                logs,
                notices,
                entries,
                has_baselines,
                delays,
                changes,
                conflicts,
            })
        })
    }
}

fn has_impact(cost_impact: f64, schedule_impact_days: f64) -> bool {
    cost_impact > 0.0 || schedule_impact_days > 0.0
}

fn build_delay_chain(
    delay: &DelayEventRecord,
    records: &ProjectRecords,
    crew_hours_per_day: f64,
) -> CausationChain {
    // Delay events are referenced by id; the documenting logs are the ones
    // whose embedded delay list carries this event.
    let related_logs: Vec<RelatedLogRef> = records
        .logs
        .iter()
        .filter(|log| log.delay_event_ids.iter().any(|id| id == &delay.id))
        .map(log_ref)
        .collect();

    let notices: Vec<NoticeLogRecord> = records
        .notices
        .iter()
        .filter(|notice| {
            notice
                .related_delay_event_ids
                .iter()
                .any(|id| id == &delay.id)
                || delay
                    .notice_sent_date
                    .as_deref()
                    .is_some_and(|sent| sent == notice.date_sent)
        })
        .cloned()
        .collect();

    let impact = compute_productivity_impact(
        &records.entries,
        Some(delay.event_date.as_str()),
        records.has_baselines,
    );

    let trigger = TriggerEvent {
        id: delay.id.clone(),
        kind: TriggerKind::DelayEvent,
        date: delay.event_date.clone(),
        description: delay.description.clone(),
        responsible_party: delay.responsible_party.clone(),
        cost_impact: delay.cost_impact,
        schedule_impact_days: if crew_hours_per_day > 0.0 {
            delay.delay_hours / crew_hours_per_day
        } else {
            0.0
        },
        daily_log_id: None,
    };

    assemble_chain(trigger, related_logs, notices, impact, delay.cost_impact)
}

fn build_change_chain(change: &ChangeEntryRecord, records: &ProjectRecords) -> CausationChain {
    // Changes carry no cross-log id: correlate by description + initiator.
    // A best-effort link, not a foreign key.
    let related_logs: Vec<RelatedLogRef> = records
        .logs
        .iter()
        .filter(|log| {
            log.changes.iter().any(|entry| {
                text_matches(&entry.description, &change.description)
                    && optional_text_matches(&entry.initiated_by, &change.initiated_by)
            })
        })
        .map(log_ref)
        .collect();

    let notices: Vec<NoticeLogRecord> = records
        .notices
        .iter()
        .filter(|notice| notice.related_change_ids.iter().any(|id| id == &change.id))
        .cloned()
        .collect();

    let split_date = earliest_log_date(&related_logs);
    let impact =
        compute_productivity_impact(&records.entries, split_date.as_deref(), records.has_baselines);

    let trigger = TriggerEvent {
        id: change.id.clone(),
        kind: TriggerKind::ChangeOrder,
        date: change.entry_date.clone(),
        description: change.description.clone(),
        responsible_party: change.initiated_by.clone(),
        cost_impact: change.estimated_cost_impact,
        schedule_impact_days: change.schedule_impact_days,
        daily_log_id: Some(change.daily_log_id.clone()),
    };

    assemble_chain(
        trigger,
        related_logs,
        notices,
        impact,
        change.estimated_cost_impact,
    )
}

fn build_conflict_chain(conflict: &ConflictEntryRecord, records: &ProjectRecords) -> CausationChain {
    // Conflicts correlate to logs by description only.
    let related_logs: Vec<RelatedLogRef> = records
        .logs
        .iter()
        .filter(|log| {
            log.conflicts
                .iter()
                .any(|entry| text_matches(&entry.description, &conflict.description))
        })
        .map(log_ref)
        .collect();

    // The notice log has no conflict id list; conflicts link to notices
    // through their parent daily log.
    let notices: Vec<NoticeLogRecord> = records
        .notices
        .iter()
        .filter(|notice| {
            notice
                .related_daily_log_ids
                .iter()
                .any(|id| id == &conflict.daily_log_id)
        })
        .cloned()
        .collect();

    let split_date = earliest_log_date(&related_logs);
    let impact =
        compute_productivity_impact(&records.entries, split_date.as_deref(), records.has_baselines);

    let trigger = TriggerEvent {
        id: conflict.id.clone(),
        kind: TriggerKind::Conflict,
        date: conflict.entry_date.clone(),
        description: conflict.description.clone(),
        responsible_party: conflict.trades_involved.clone(),
        cost_impact: conflict.estimated_cost_impact,
        schedule_impact_days: conflict.schedule_impact_days,
        daily_log_id: Some(conflict.daily_log_id.clone()),
    };

    assemble_chain(
        trigger,
        related_logs,
        notices,
        impact,
        conflict.estimated_cost_impact,
    )
}

fn assemble_chain(
    trigger: TriggerEvent,
    related_logs: Vec<RelatedLogRef>,
    notices: Vec<NoticeLogRecord>,
    productivity_impact: Option<ProductivityImpact>,
    estimated_cost_impact: f64,
) -> CausationChain {
    let completeness_score = completeness_score(
        !related_logs.is_empty(),
        !notices.is_empty(),
        productivity_impact.is_some(),
        estimated_cost_impact > 0.0,
    );

    CausationChain {
        id: format!("chain-{}", trigger.id),
        trigger_id: trigger.id.clone(),
        kind: trigger.kind,
        trigger,
        related_logs,
        notices,
        productivity_impact,
        estimated_cost_impact,
        completeness_score,
    }
}

/// The trigger itself is always step one; each present artifact adds one,
/// capped at five.
fn completeness_score(
    has_logs: bool,
    has_notices: bool,
    has_impact: bool,
    has_damages: bool,
) -> u8 {
    let score = 1
        + u8::from(has_logs)
        + u8::from(has_notices)
        + u8::from(has_impact)
        + u8::from(has_damages);
    score.min(5)
}

/// Splits the project's productivity entries at the event date and compares
/// mean unit rates. None when either side is empty or the project tracks no
/// baselines; a measured gain reports as 0% loss.
fn compute_productivity_impact(
    entries: &[ProductivityEntryRecord],
    split_date: Option<&str>,
    has_baselines: bool,
) -> Option<ProductivityImpact> {
    let split_date = split_date?;
    if !has_baselines {
        return None;
    }

    let mut before: Vec<f64> = Vec::new();
    let mut after: Vec<f64> = Vec::new();
    for entry in entries {
        match entry.entry_date.as_str().cmp(split_date) {
            Ordering::Less => before.push(entry.unit_rate),
            _ => after.push(entry.unit_rate),
        }
    }

    if before.is_empty() || after.is_empty() {
        return None;
    }

    let before_average = mean(&before);
    let after_average = mean(&after);
    if before_average <= 0.0 {
        return None;
    }

    let productivity_loss_pct =
        (((before_average - after_average) / before_average) * 100.0).max(0.0);

    Some(ProductivityImpact {
        split_date: split_date.to_string(),
        before_average_rate: before_average,
        after_average_rate: after_average,
        productivity_loss_pct,
        entries_before: before.len(),
        entries_after: after.len(),
    })
}

fn log_ref(log: &DailyLogRecord) -> RelatedLogRef {
    RelatedLogRef {
        daily_log_id: log.id.clone(),
        log_date: log.log_date.clone(),
        status: log.status.clone(),
    }
}

fn earliest_log_date(related_logs: &[RelatedLogRef]) -> Option<String> {
    related_logs
        .iter()
        .map(|log| log.log_date.as_str())
        .min()
        .map(|date| date.to_string())
}

fn text_matches(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn optional_text_matches(a: &Option<String>, b: &Option<String>) -> bool {
    match (a.as_deref(), b.as_deref()) {
        (Some(a), Some(b)) => text_matches(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
