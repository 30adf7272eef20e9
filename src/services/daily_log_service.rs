use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::daily_log_repository::DailyLogRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::daily_log::{
    ChangeEntryRecord, ConflictEntryRecord, DailyLogRecord, DailyLogSaveInput, ManpowerEntry,
    WorkPerformedItem, LOG_STATUS_DRAFT, LOG_STATUS_SUBMITTED,
};

#[derive(Clone)]
pub struct DailyLogService {
    db: DbPool,
}

impl DailyLogService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Inserts or fully replaces a daily log with its embedded line items.
    /// The record store is last-write-wins; concurrent editors are not
    /// coordinated here.
    pub fn save_daily_log(&self, input: DailyLogSaveInput) -> AppResult<DailyLogRecord> {
        let log_date = normalize_date(&input.log_date)?;
        let status = match input.status.as_deref() {
            None => LOG_STATUS_DRAFT.to_string(),
            Some(value) if value == LOG_STATUS_DRAFT || value == LOG_STATUS_SUBMITTED => {
                value.to_string()
            }
            Some(other) => {
                return Err(AppError::validation(format!(
                    "unknown daily log status: {other}"
                )))
            }
        };

        let now = Utc::now().to_rfc3339();
        let (id, created_at) = match input.id.as_deref() {
            Some(existing_id) => {
                let existing = self
                    .db
                    .with_connection(|conn| DailyLogRepository::find_by_id(conn, existing_id))?
                    .ok_or_else(AppError::not_found)?;
                (existing.id, existing.created_at)
            }
            None => (uuid::Uuid::new_v4().to_string(), now.clone()),
        };

        let project_id = input.project_id.clone();

        let work_performed: Vec<WorkPerformedItem> = input
            .work_performed
            .into_iter()
            .map(|item| WorkPerformedItem {
                id: uuid::Uuid::new_v4().to_string(),
                cost_code_id: item.cost_code_id,
                description: item.description,
                quantity: item.quantity,
                unit_of_measure: item.unit_of_measure,
            })
            .collect();

        let manpower: Vec<ManpowerEntry> = input
            .manpower
            .into_iter()
            .map(|entry| ManpowerEntry {
                id: uuid::Uuid::new_v4().to_string(),
                cost_code_id: entry.cost_code_id,
                trade: entry.trade,
                workers: entry.workers,
                hours_each: entry.hours_each,
            })
            .collect();

        let changes: Vec<ChangeEntryRecord> = input
            .changes
            .into_iter()
            .map(|change| ChangeEntryRecord {
                id: uuid::Uuid::new_v4().to_string(),
                daily_log_id: id.clone(),
                project_id: project_id.clone(),
                entry_date: log_date.clone(),
                description: change.description,
                initiated_by: change.initiated_by,
                schedule_impact_days: change.schedule_impact_days.unwrap_or(0.0),
                estimated_cost_impact: change.estimated_cost_impact.unwrap_or(0.0),
            })
            .collect();

        let conflicts: Vec<ConflictEntryRecord> = input
            .conflicts
            .into_iter()
            .map(|conflict| ConflictEntryRecord {
                id: uuid::Uuid::new_v4().to_string(),
                daily_log_id: id.clone(),
                project_id: project_id.clone(),
                entry_date: log_date.clone(),
                description: conflict.description,
                trades_involved: conflict.trades_involved,
                schedule_impact_days: conflict.schedule_impact_days.unwrap_or(0.0),
                estimated_cost_impact: conflict.estimated_cost_impact.unwrap_or(0.0),
            })
            .collect();

        let record = DailyLogRecord {
            id,
            project_id,
            log_date,
            weather: input.weather,
            notes: input.notes,
            status,
            work_performed,
            manpower,
            delay_event_ids: input.delay_event_ids,
            changes,
            conflicts,
            created_at,
            updated_at: now,
        };

        self.db
            .with_connection(|conn| DailyLogRepository::save(conn, &record))?;
        info!(
            target: "app::records",
            daily_log_id = %record.id,
            log_date = %record.log_date,
            status = %record.status,
            "daily log saved"
        );
        Ok(record)
    }

    pub fn get_daily_log(&self, id: &str) -> AppResult<DailyLogRecord> {
        self.db
            .with_connection(|conn| DailyLogRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)
    }

    pub fn list_daily_logs(&self, project_id: &str) -> AppResult<Vec<DailyLogRecord>> {
        let logs = self
            .db
            .with_connection(|conn| DailyLogRepository::list_by_project(conn, project_id))?;
        debug!(target: "app::records", count = logs.len(), "daily logs listed");
        Ok(logs)
    }
}

fn normalize_date(value: &str) -> AppResult<String> {
    let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {value}")))?;
    Ok(parsed.to_string())
}
