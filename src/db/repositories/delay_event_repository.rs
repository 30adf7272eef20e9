use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::delay::DelayEventRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        event_date,
        description,
        responsible_party,
        delay_hours,
        cost_impact,
        notice_sent_date,
        created_at
    FROM delay_events
"#;

#[derive(Debug, Clone)]
pub struct DelayEventRow {
    pub id: String,
    pub project_id: String,
    pub event_date: String,
    pub description: String,
    pub responsible_party: Option<String>,
    pub delay_hours: f64,
    pub cost_impact: f64,
    pub notice_sent_date: Option<String>,
    pub created_at: String,
}

impl DelayEventRow {
    pub fn from_record(record: &DelayEventRecord) -> Self {
        Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            event_date: record.event_date.clone(),
            description: record.description.clone(),
            responsible_party: record.responsible_party.clone(),
            delay_hours: record.delay_hours,
            cost_impact: record.cost_impact,
            notice_sent_date: record.notice_sent_date.clone(),
            created_at: record.created_at.clone(),
        }
    }

    pub fn into_record(self) -> DelayEventRecord {
        DelayEventRecord {
            id: self.id,
            project_id: self.project_id,
            event_date: self.event_date,
            description: self.description,
            responsible_party: self.responsible_party,
            delay_hours: self.delay_hours,
            cost_impact: self.cost_impact,
            notice_sent_date: self.notice_sent_date,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for DelayEventRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            event_date: row.get("event_date")?,
            description: row.get("description")?,
            responsible_party: row.get("responsible_party")?,
            delay_hours: row.get("delay_hours")?,
            cost_impact: row.get("cost_impact")?,
            notice_sent_date: row.get("notice_sent_date")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct DelayEventRepository;

impl DelayEventRepository {
    pub fn insert(conn: &Connection, row: &DelayEventRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO delay_events (
                    id, project_id, event_date, description, responsible_party,
                    delay_hours, cost_impact, notice_sent_date, created_at
                ) VALUES (
                    :id, :project_id, :event_date, :description, :responsible_party,
                    :delay_hours, :cost_impact, :notice_sent_date, :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":project_id": &row.project_id,
                ":event_date": &row.event_date,
                ":description": &row.description,
                ":responsible_party": &row.responsible_party,
                ":delay_hours": &row.delay_hours,
                ":cost_impact": &row.cost_impact,
                ":notice_sent_date": &row.notice_sent_date,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn list_by_project(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Vec<DelayEventRecord>> {
        let sql = format!("{BASE_SELECT} WHERE project_id = :project_id ORDER BY event_date");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                DelayEventRow::try_from(row)
            })?
            .map(|row| row.map_err(AppError::from).map(DelayEventRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
