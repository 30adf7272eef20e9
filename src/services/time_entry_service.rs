use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::time_entry_repository::{TimeEntryRepository, TimeEntryRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::time_entry::{TimeEntryCreateInput, TimeEntryRecord, TIME_ENTRY_STATUS_PENDING};

#[derive(Clone)]
pub struct TimeEntryService {
    db: DbPool,
}

impl TimeEntryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_time_entry(&self, input: TimeEntryCreateInput) -> AppResult<TimeEntryRecord> {
        let worker_name = input.worker_name.trim().to_string();
        if worker_name.is_empty() {
            return Err(AppError::validation("worker name must not be empty"));
        }
        if !input.hours.is_finite() || input.hours <= 0.0 {
            return Err(AppError::validation("hours must be positive"));
        }
        let entry_date = normalize_date(&input.entry_date)?;

        let record = TimeEntryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: input.project_id,
            worker_name,
            entry_date,
            cost_code_id: input.cost_code_id,
            hours: input.hours,
            status: TIME_ENTRY_STATUS_PENDING.to_string(),
            approved_at: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let row = TimeEntryRow::from_record(&record);
        self.db
            .with_connection(|conn| TimeEntryRepository::insert(conn, &row))?;
        info!(target: "app::records", time_entry_id = %record.id, "time entry created");
        Ok(record)
    }

    pub fn list_time_entries(&self, project_id: &str) -> AppResult<Vec<TimeEntryRecord>> {
        let rows = self
            .db
            .with_connection(|conn| TimeEntryRepository::list_by_project(conn, project_id))?;
        let records: Vec<TimeEntryRecord> =
            rows.into_iter().map(TimeEntryRow::into_record).collect();
        debug!(target: "app::records", count = records.len(), "time entries listed");
        Ok(records)
    }

    /// Approves every pending entry for the date and returns how many were
    /// approved. Derivation is the caller's follow-up, not part of the
    /// approval write.
    pub fn approve_for_date(&self, project_id: &str, entry_date: &str) -> AppResult<usize> {
        let entry_date = normalize_date(entry_date)?;
        let approved_at = Utc::now().to_rfc3339();
        let approved = self.db.with_connection(|conn| {
            TimeEntryRepository::approve_pending_for_date(conn, project_id, &entry_date, &approved_at)
        })?;
        info!(
            target: "app::records",
            entry_date = %entry_date,
            approved,
            "time entries approved"
        );
        Ok(approved)
    }
}

fn normalize_date(value: &str) -> AppResult<String> {
    let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {value}")))?;
    Ok(parsed.to_string())
}
