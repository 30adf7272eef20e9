use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::notice::NoticeLogRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        notice_type,
        subject,
        date_sent,
        related_delay_event_ids,
        related_change_ids,
        related_daily_log_ids,
        created_at
    FROM notice_log
"#;

#[derive(Debug, Clone)]
pub struct NoticeLogRow {
    pub id: String,
    pub project_id: String,
    pub notice_type: String,
    pub subject: Option<String>,
    pub date_sent: String,
    pub related_delay_event_ids: String,
    pub related_change_ids: String,
    pub related_daily_log_ids: String,
    pub created_at: String,
}

impl NoticeLogRow {
    pub fn from_record(record: &NoticeLogRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            notice_type: record.notice_type.clone(),
            subject: record.subject.clone(),
            date_sent: record.date_sent.clone(),
            related_delay_event_ids: serialize_ids(&record.related_delay_event_ids)?,
            related_change_ids: serialize_ids(&record.related_change_ids)?,
            related_daily_log_ids: serialize_ids(&record.related_daily_log_ids)?,
            created_at: record.created_at.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<NoticeLogRecord> {
        Ok(NoticeLogRecord {
            id: self.id,
            project_id: self.project_id,
            notice_type: self.notice_type,
            subject: self.subject,
            date_sent: self.date_sent,
            related_delay_event_ids: deserialize_ids(&self.related_delay_event_ids)?,
            related_change_ids: deserialize_ids(&self.related_change_ids)?,
            related_daily_log_ids: deserialize_ids(&self.related_daily_log_ids)?,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<&Row<'_>> for NoticeLogRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            notice_type: row.get("notice_type")?,
            subject: row.get("subject")?,
            date_sent: row.get("date_sent")?,
            related_delay_event_ids: row.get("related_delay_event_ids")?,
            related_change_ids: row.get("related_change_ids")?,
            related_daily_log_ids: row.get("related_daily_log_ids")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct NoticeRepository;

impl NoticeRepository {
    pub fn insert(conn: &Connection, record: &NoticeLogRecord) -> AppResult<()> {
        let row = NoticeLogRow::from_record(record)?;
        conn.execute(
            r#"
                INSERT INTO notice_log (
                    id, project_id, notice_type, subject, date_sent,
                    related_delay_event_ids, related_change_ids, related_daily_log_ids,
                    created_at
                ) VALUES (
                    :id, :project_id, :notice_type, :subject, :date_sent,
                    :related_delay_event_ids, :related_change_ids, :related_daily_log_ids,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":project_id": &row.project_id,
                ":notice_type": &row.notice_type,
                ":subject": &row.subject,
                ":date_sent": &row.date_sent,
                ":related_delay_event_ids": &row.related_delay_event_ids,
                ":related_change_ids": &row.related_change_ids,
                ":related_daily_log_ids": &row.related_daily_log_ids,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn list_by_project(conn: &Connection, project_id: &str) -> AppResult<Vec<NoticeLogRecord>> {
        let sql = format!("{BASE_SELECT} WHERE project_id = :project_id ORDER BY date_sent");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                NoticeLogRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}

fn serialize_ids(ids: &[String]) -> AppResult<String> {
    serde_json::to_string(ids).map_err(AppError::from)
}

fn deserialize_ids(raw: &str) -> AppResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(AppError::from)
}
