use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::AppResult;
use crate::models::time_entry::TimeEntryRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        worker_name,
        entry_date,
        cost_code_id,
        hours,
        status,
        approved_at,
        created_at
    FROM time_entries
"#;

#[derive(Debug, Clone)]
pub struct TimeEntryRow {
    pub id: String,
    pub project_id: String,
    pub worker_name: String,
    pub entry_date: String,
    pub cost_code_id: Option<String>,
    pub hours: f64,
    pub status: String,
    pub approved_at: Option<String>,
    pub created_at: String,
}

impl TimeEntryRow {
    pub fn from_record(record: &TimeEntryRecord) -> Self {
        Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            worker_name: record.worker_name.clone(),
            entry_date: record.entry_date.clone(),
            cost_code_id: record.cost_code_id.clone(),
            hours: record.hours,
            status: record.status.clone(),
            approved_at: record.approved_at.clone(),
            created_at: record.created_at.clone(),
        }
    }

    pub fn into_record(self) -> TimeEntryRecord {
        TimeEntryRecord {
            id: self.id,
            project_id: self.project_id,
            worker_name: self.worker_name,
            entry_date: self.entry_date,
            cost_code_id: self.cost_code_id,
            hours: self.hours,
            status: self.status,
            approved_at: self.approved_at,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for TimeEntryRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            worker_name: row.get("worker_name")?,
            entry_date: row.get("entry_date")?,
            cost_code_id: row.get("cost_code_id")?,
            hours: row.get("hours")?,
            status: row.get("status")?,
            approved_at: row.get("approved_at")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct TimeEntryRepository;

impl TimeEntryRepository {
    pub fn insert(conn: &Connection, row: &TimeEntryRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO time_entries (
                    id, project_id, worker_name, entry_date, cost_code_id,
                    hours, status, approved_at, created_at
                ) VALUES (
                    :id, :project_id, :worker_name, :entry_date, :cost_code_id,
                    :hours, :status, :approved_at, :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":project_id": &row.project_id,
                ":worker_name": &row.worker_name,
                ":entry_date": &row.entry_date,
                ":cost_code_id": &row.cost_code_id,
                ":hours": &row.hours,
                ":status": &row.status,
                ":approved_at": &row.approved_at,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn list_by_project(conn: &Connection, project_id: &str) -> AppResult<Vec<TimeEntryRow>> {
        let sql = format!("{BASE_SELECT} WHERE project_id = :project_id ORDER BY entry_date, created_at");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                TimeEntryRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_approved_by_date(
        conn: &Connection,
        project_id: &str,
        entry_date: &str,
    ) -> AppResult<Vec<TimeEntryRow>> {
        let sql = format!(
            "{BASE_SELECT} WHERE project_id = :project_id AND entry_date = :entry_date AND status = 'approved'"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {":project_id": project_id, ":entry_date": entry_date},
                |row| TimeEntryRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn approve_pending_for_date(
        conn: &Connection,
        project_id: &str,
        entry_date: &str,
        approved_at: &str,
    ) -> AppResult<usize> {
        let updated = conn.execute(
            r#"
                UPDATE time_entries
                SET status = 'approved', approved_at = :approved_at
                WHERE project_id = :project_id
                  AND entry_date = :entry_date
                  AND status = 'pending'
            "#,
            named_params! {
                ":approved_at": approved_at,
                ":project_id": project_id,
                ":entry_date": entry_date,
            },
        )?;

        Ok(updated)
    }
}
