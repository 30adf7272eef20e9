use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::daily_log::{
    ChangeEntryRecord, ConflictEntryRecord, DailyLogRecord, ManpowerEntry, WorkPerformedItem,
};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        log_date,
        weather,
        notes,
        status,
        created_at,
        updated_at
    FROM daily_logs
"#;

#[derive(Debug, Clone)]
pub struct DailyLogRow {
    pub id: String,
    pub project_id: String,
    pub log_date: String,
    pub weather: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<&Row<'_>> for DailyLogRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            log_date: row.get("log_date")?,
            weather: row.get("weather")?,
            notes: row.get("notes")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct DailyLogRepository;

impl DailyLogRepository {
    /// Upserts the log header and rewrites its line items. Line items are
    /// owned by the log; an edited log replaces them wholesale.
    pub fn save(conn: &Connection, record: &DailyLogRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO daily_logs (
                    id, project_id, log_date, weather, notes, status, created_at, updated_at
                ) VALUES (
                    :id, :project_id, :log_date, :weather, :notes, :status, :created_at, :updated_at
                )
                ON CONFLICT(id) DO UPDATE SET
                    project_id = excluded.project_id,
                    log_date = excluded.log_date,
                    weather = excluded.weather,
                    notes = excluded.notes,
                    status = excluded.status,
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":id": &record.id,
                ":project_id": &record.project_id,
                ":log_date": &record.log_date,
                ":weather": &record.weather,
                ":notes": &record.notes,
                ":status": &record.status,
                ":created_at": &record.created_at,
                ":updated_at": &record.updated_at,
            },
        )?;

        for table in [
            "work_performed_items",
            "manpower_entries",
            "daily_log_delay_refs",
            "change_entries",
            "conflict_entries",
        ] {
            conn.execute(
                &format!("DELETE FROM {table} WHERE daily_log_id = :id"),
                named_params! {":id": &record.id},
            )?;
        }

        for item in &record.work_performed {
            conn.execute(
                r#"
                    INSERT INTO work_performed_items (
                        id, daily_log_id, cost_code_id, description, quantity, unit_of_measure
                    ) VALUES (:id, :daily_log_id, :cost_code_id, :description, :quantity, :unit_of_measure)
                "#,
                named_params! {
                    ":id": &item.id,
                    ":daily_log_id": &record.id,
                    ":cost_code_id": &item.cost_code_id,
                    ":description": &item.description,
                    ":quantity": &item.quantity,
                    ":unit_of_measure": &item.unit_of_measure,
                },
            )?;
        }

        for entry in &record.manpower {
            conn.execute(
                r#"
                    INSERT INTO manpower_entries (
                        id, daily_log_id, cost_code_id, trade, workers, hours_each
                    ) VALUES (:id, :daily_log_id, :cost_code_id, :trade, :workers, :hours_each)
                "#,
                named_params! {
                    ":id": &entry.id,
                    ":daily_log_id": &record.id,
                    ":cost_code_id": &entry.cost_code_id,
                    ":trade": &entry.trade,
                    ":workers": &entry.workers,
                    ":hours_each": &entry.hours_each,
                },
            )?;
        }

        for delay_event_id in &record.delay_event_ids {
            conn.execute(
                r#"
                    INSERT OR IGNORE INTO daily_log_delay_refs (daily_log_id, delay_event_id)
                    VALUES (:daily_log_id, :delay_event_id)
                "#,
                named_params! {
                    ":daily_log_id": &record.id,
                    ":delay_event_id": delay_event_id,
                },
            )?;
        }

        for change in &record.changes {
            conn.execute(
                r#"
                    INSERT INTO change_entries (
                        id, daily_log_id, project_id, entry_date, description,
                        initiated_by, schedule_impact_days, estimated_cost_impact
                    ) VALUES (
                        :id, :daily_log_id, :project_id, :entry_date, :description,
                        :initiated_by, :schedule_impact_days, :estimated_cost_impact
                    )
                "#,
                named_params! {
                    ":id": &change.id,
                    ":daily_log_id": &record.id,
                    ":project_id": &change.project_id,
                    ":entry_date": &change.entry_date,
                    ":description": &change.description,
                    ":initiated_by": &change.initiated_by,
                    ":schedule_impact_days": &change.schedule_impact_days,
                    ":estimated_cost_impact": &change.estimated_cost_impact,
                },
            )?;
        }

        for conflict in &record.conflicts {
            conn.execute(
                r#"
                    INSERT INTO conflict_entries (
                        id, daily_log_id, project_id, entry_date, description,
                        trades_involved, schedule_impact_days, estimated_cost_impact
                    ) VALUES (
                        :id, :daily_log_id, :project_id, :entry_date, :description,
                        :trades_involved, :schedule_impact_days, :estimated_cost_impact
                    )
                "#,
                named_params! {
                    ":id": &conflict.id,
                    ":daily_log_id": &record.id,
                    ":project_id": &conflict.project_id,
                    ":entry_date": &conflict.entry_date,
                    ":description": &conflict.description,
                    ":trades_involved": &conflict.trades_involved,
                    ":schedule_impact_days": &conflict.schedule_impact_days,
                    ":estimated_cost_impact": &conflict.estimated_cost_impact,
                },
            )?;
        }

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<DailyLogRecord>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let header = stmt
            .query_row(named_params! {":id": id}, |row| DailyLogRow::try_from(row))
            .optional()?;

        header.map(|row| Self::assemble(conn, row)).transpose()
    }

    pub fn list_by_project(conn: &Connection, project_id: &str) -> AppResult<Vec<DailyLogRecord>> {
        let sql = format!("{BASE_SELECT} WHERE project_id = :project_id ORDER BY log_date");
        let mut stmt = conn.prepare(&sql)?;
        let headers = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                DailyLogRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|row| Self::assemble(conn, row))
            .collect()
    }

    pub fn list_submitted_by_date(
        conn: &Connection,
        project_id: &str,
        log_date: &str,
    ) -> AppResult<Vec<DailyLogRecord>> {
        let sql = format!(
            "{BASE_SELECT} WHERE project_id = :project_id AND log_date = :log_date AND status = 'submitted'"
        );
        let mut stmt = conn.prepare(&sql)?;
        let headers = stmt
            .query_map(
                named_params! {":project_id": project_id, ":log_date": log_date},
                |row| DailyLogRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|row| Self::assemble(conn, row))
            .collect()
    }

    pub fn list_change_entries(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Vec<ChangeEntryRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, daily_log_id, project_id, entry_date, description,
                       initiated_by, schedule_impact_days, estimated_cost_impact
                FROM change_entries
                WHERE project_id = :project_id
                ORDER BY entry_date
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, change_from_row)?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_conflict_entries(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Vec<ConflictEntryRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, daily_log_id, project_id, entry_date, description,
                       trades_involved, schedule_impact_days, estimated_cost_impact
                FROM conflict_entries
                WHERE project_id = :project_id
                ORDER BY entry_date
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, conflict_from_row)?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    fn assemble(conn: &Connection, header: DailyLogRow) -> AppResult<DailyLogRecord> {
        let work_performed = Self::load_work_items(conn, &header.id)?;
        let manpower = Self::load_manpower(conn, &header.id)?;
        let delay_event_ids = Self::load_delay_refs(conn, &header.id)?;
        let changes = Self::load_changes(conn, &header.id)?;
        let conflicts = Self::load_conflicts(conn, &header.id)?;

        Ok(DailyLogRecord {
            id: header.id,
            project_id: header.project_id,
            log_date: header.log_date,
            weather: header.weather,
            notes: header.notes,
            status: header.status,
            work_performed,
            manpower,
            delay_event_ids,
            changes,
            conflicts,
            created_at: header.created_at,
            updated_at: header.updated_at,
        })
    }

    fn load_work_items(conn: &Connection, log_id: &str) -> AppResult<Vec<WorkPerformedItem>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, cost_code_id, description, quantity, unit_of_measure
                FROM work_performed_items
                WHERE daily_log_id = :log_id
                ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":log_id": log_id}, |row| {
                Ok(WorkPerformedItem {
                    id: row.get("id")?,
                    cost_code_id: row.get("cost_code_id")?,
                    description: row.get("description")?,
                    quantity: row.get("quantity")?,
                    unit_of_measure: row.get("unit_of_measure")?,
                })
            })?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    fn load_manpower(conn: &Connection, log_id: &str) -> AppResult<Vec<ManpowerEntry>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, cost_code_id, trade, workers, hours_each
                FROM manpower_entries
                WHERE daily_log_id = :log_id
                ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":log_id": log_id}, |row| {
                Ok(ManpowerEntry {
                    id: row.get("id")?,
                    cost_code_id: row.get("cost_code_id")?,
                    trade: row.get("trade")?,
                    workers: row.get("workers")?,
                    hours_each: row.get("hours_each")?,
                })
            })?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    fn load_delay_refs(conn: &Connection, log_id: &str) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT delay_event_id
                FROM daily_log_delay_refs
                WHERE daily_log_id = :log_id
                ORDER BY delay_event_id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":log_id": log_id}, |row| {
                row.get::<_, String>("delay_event_id")
            })?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    fn load_changes(conn: &Connection, log_id: &str) -> AppResult<Vec<ChangeEntryRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, daily_log_id, project_id, entry_date, description,
                       initiated_by, schedule_impact_days, estimated_cost_impact
                FROM change_entries
                WHERE daily_log_id = :log_id
                ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":log_id": log_id}, change_from_row)?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    fn load_conflicts(conn: &Connection, log_id: &str) -> AppResult<Vec<ConflictEntryRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, daily_log_id, project_id, entry_date, description,
                       trades_involved, schedule_impact_days, estimated_cost_impact
                FROM conflict_entries
                WHERE daily_log_id = :log_id
                ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":log_id": log_id}, conflict_from_row)?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}

fn change_from_row(row: &Row<'_>) -> Result<ChangeEntryRecord, rusqlite::Error> {
    Ok(ChangeEntryRecord {
        id: row.get("id")?,
        daily_log_id: row.get("daily_log_id")?,
        project_id: row.get("project_id")?,
        entry_date: row.get("entry_date")?,
        description: row.get("description")?,
        initiated_by: row.get("initiated_by")?,
        schedule_impact_days: row.get("schedule_impact_days")?,
        estimated_cost_impact: row.get("estimated_cost_impact")?,
    })
}

fn conflict_from_row(row: &Row<'_>) -> Result<ConflictEntryRecord, rusqlite::Error> {
    Ok(ConflictEntryRecord {
        id: row.get("id")?,
        daily_log_id: row.get("daily_log_id")?,
        project_id: row.get("project_id")?,
        entry_date: row.get("entry_date")?,
        description: row.get("description")?,
        trades_involved: row.get("trades_involved")?,
        schedule_impact_days: row.get("schedule_impact_days")?,
        estimated_cost_impact: row.get("estimated_cost_impact")?,
    })
}
