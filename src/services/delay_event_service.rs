use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::delay_event_repository::{DelayEventRepository, DelayEventRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::delay::{DelayEventCreateInput, DelayEventRecord};

#[derive(Clone)]
pub struct DelayEventService {
    db: DbPool,
}

impl DelayEventService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_delay_event(&self, input: DelayEventCreateInput) -> AppResult<DelayEventRecord> {
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::validation("description must not be empty"));
        }
        let event_date = normalize_date(&input.event_date)?;
        let notice_sent_date = input
            .notice_sent_date
            .as_deref()
            .map(normalize_date)
            .transpose()?;

        let record = DelayEventRecord {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: input.project_id,
            event_date,
            description,
            responsible_party: input
                .responsible_party
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            delay_hours: input.delay_hours.unwrap_or(0.0),
            cost_impact: input.cost_impact.unwrap_or(0.0),
            notice_sent_date,
            created_at: Utc::now().to_rfc3339(),
        };

        let row = DelayEventRow::from_record(&record);
        self.db
            .with_connection(|conn| DelayEventRepository::insert(conn, &row))?;
        info!(target: "app::records", delay_event_id = %record.id, "delay event recorded");
        Ok(record)
    }

    pub fn list_delay_events(&self, project_id: &str) -> AppResult<Vec<DelayEventRecord>> {
        let records = self
            .db
            .with_connection(|conn| DelayEventRepository::list_by_project(conn, project_id))?;
        debug!(target: "app::records", count = records.len(), "delay events listed");
        Ok(records)
    }
}

fn normalize_date(value: &str) -> AppResult<String> {
    let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {value}")))?;
    Ok(parsed.to_string())
}
