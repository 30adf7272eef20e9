use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::notice_repository::NoticeRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::notice::{NoticeCreateInput, NoticeLogRecord};

#[derive(Clone)]
pub struct NoticeService {
    db: DbPool,
}

impl NoticeService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_notice(&self, input: NoticeCreateInput) -> AppResult<NoticeLogRecord> {
        let notice_type = input.notice_type.trim().to_string();
        if notice_type.is_empty() {
            return Err(AppError::validation("notice type must not be empty"));
        }
        let date_sent = normalize_date(&input.date_sent)?;

        let record = NoticeLogRecord {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: input.project_id,
            notice_type,
            subject: input
                .subject
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            date_sent,
            related_delay_event_ids: input.related_delay_event_ids,
            related_change_ids: input.related_change_ids,
            related_daily_log_ids: input.related_daily_log_ids,
            created_at: Utc::now().to_rfc3339(),
        };

        self.db
            .with_connection(|conn| NoticeRepository::insert(conn, &record))?;
        info!(target: "app::records", notice_id = %record.id, "notice logged");
        Ok(record)
    }

    pub fn list_notices(&self, project_id: &str) -> AppResult<Vec<NoticeLogRecord>> {
        let notices = self
            .db
            .with_connection(|conn| NoticeRepository::list_by_project(conn, project_id))?;
        debug!(target: "app::records", count = notices.len(), "notices listed");
        Ok(notices)
    }
}

fn normalize_date(value: &str) -> AppResult<String> {
    let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {value}")))?;
    Ok(parsed.to_string())
}
