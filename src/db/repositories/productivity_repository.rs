use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::productivity::{
    EntrySource, PeriodType, ProductivityAnalyticsRecord, ProductivityEntryRecord,
};

const ENTRY_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        cost_code_id,
        entry_date,
        quantity,
        labor_hours,
        unit_rate,
        source,
        source_log_id,
        created_at
    FROM productivity_entries
"#;

const ANALYTICS_SELECT: &str = r#"
    SELECT
        cost_code_id,
        period_type,
        project_id,
        period_end,
        peak_unit_rate,
        average_unit_rate,
        low_unit_rate,
        standard_deviation,
        total_labor_hours,
        total_quantity,
        cost_variance,
        schedule_variance_days,
        planned_vs_actual_variance
    FROM productivity_analytics
"#;

#[derive(Debug, Clone)]
pub struct ProductivityEntryRow {
    pub id: String,
    pub project_id: String,
    pub cost_code_id: String,
    pub entry_date: String,
    pub quantity: f64,
    pub labor_hours: f64,
    pub unit_rate: f64,
    pub source: String,
    pub source_log_id: Option<String>,
    pub created_at: String,
}

impl ProductivityEntryRow {
    pub fn from_record(record: &ProductivityEntryRecord) -> Self {
        Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            cost_code_id: record.cost_code_id.clone(),
            entry_date: record.entry_date.clone(),
            quantity: record.quantity,
            labor_hours: record.labor_hours,
            unit_rate: record.unit_rate,
            source: record.source.as_str().to_string(),
            source_log_id: record.source_log_id.clone(),
            created_at: record.created_at.clone(),
        }
    }

    pub fn into_record(self) -> AppResult<ProductivityEntryRecord> {
        let source = EntrySource::parse(&self.source)
            .ok_or_else(|| AppError::database(format!("unknown entry source: {}", self.source)))?;
        Ok(ProductivityEntryRecord {
            id: self.id,
            project_id: self.project_id,
            cost_code_id: self.cost_code_id,
            entry_date: self.entry_date,
            quantity: self.quantity,
            labor_hours: self.labor_hours,
            unit_rate: self.unit_rate,
            source,
            source_log_id: self.source_log_id,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<&Row<'_>> for ProductivityEntryRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            cost_code_id: row.get("cost_code_id")?,
            entry_date: row.get("entry_date")?,
            quantity: row.get("quantity")?,
            labor_hours: row.get("labor_hours")?,
            unit_rate: row.get("unit_rate")?,
            source: row.get("source")?,
            source_log_id: row.get("source_log_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProductivityAnalyticsRow {
    pub cost_code_id: String,
    pub period_type: String,
    pub project_id: String,
    pub period_end: String,
    pub peak_unit_rate: f64,
    pub average_unit_rate: f64,
    pub low_unit_rate: f64,
    pub standard_deviation: f64,
    pub total_labor_hours: f64,
    pub total_quantity: f64,
    pub cost_variance: Option<f64>,
    pub schedule_variance_days: Option<f64>,
    pub planned_vs_actual_variance: Option<f64>,
}

impl ProductivityAnalyticsRow {
    pub fn from_record(record: &ProductivityAnalyticsRecord) -> Self {
        Self {
            cost_code_id: record.cost_code_id.clone(),
            period_type: record.period_type.as_str().to_string(),
            project_id: record.project_id.clone(),
            period_end: record.period_end.clone(),
            peak_unit_rate: record.peak_unit_rate,
            average_unit_rate: record.average_unit_rate,
            low_unit_rate: record.low_unit_rate,
            standard_deviation: record.standard_deviation,
            total_labor_hours: record.total_labor_hours,
            total_quantity: record.total_quantity,
            cost_variance: record.cost_variance,
            schedule_variance_days: record.schedule_variance_days,
            planned_vs_actual_variance: record.planned_vs_actual_variance,
        }
    }

    pub fn into_record(self) -> AppResult<ProductivityAnalyticsRecord> {
        let period_type = PeriodType::parse(&self.period_type).ok_or_else(|| {
            AppError::database(format!("unknown period type: {}", self.period_type))
        })?;
        Ok(ProductivityAnalyticsRecord {
            project_id: self.project_id,
            cost_code_id: self.cost_code_id,
            period_type,
            period_end: self.period_end,
            peak_unit_rate: self.peak_unit_rate,
            average_unit_rate: self.average_unit_rate,
            low_unit_rate: self.low_unit_rate,
            standard_deviation: self.standard_deviation,
            total_labor_hours: self.total_labor_hours,
            total_quantity: self.total_quantity,
            cost_variance: self.cost_variance,
            schedule_variance_days: self.schedule_variance_days,
            planned_vs_actual_variance: self.planned_vs_actual_variance,
        })
    }
}

impl TryFrom<&Row<'_>> for ProductivityAnalyticsRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            cost_code_id: row.get("cost_code_id")?,
            period_type: row.get("period_type")?,
            project_id: row.get("project_id")?,
            period_end: row.get("period_end")?,
            peak_unit_rate: row.get("peak_unit_rate")?,
            average_unit_rate: row.get("average_unit_rate")?,
            low_unit_rate: row.get("low_unit_rate")?,
            standard_deviation: row.get("standard_deviation")?,
            total_labor_hours: row.get("total_labor_hours")?,
            total_quantity: row.get("total_quantity")?,
            cost_variance: row.get("cost_variance")?,
            schedule_variance_days: row.get("schedule_variance_days")?,
            planned_vs_actual_variance: row.get("planned_vs_actual_variance")?,
        })
    }
}

pub struct ProductivityRepository;

impl ProductivityRepository {
    pub fn insert_entry(conn: &Connection, row: &ProductivityEntryRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO productivity_entries (
                    id, project_id, cost_code_id, entry_date, quantity,
                    labor_hours, unit_rate, source, source_log_id, created_at
                ) VALUES (
                    :id, :project_id, :cost_code_id, :entry_date, :quantity,
                    :labor_hours, :unit_rate, :source, :source_log_id, :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":project_id": &row.project_id,
                ":cost_code_id": &row.cost_code_id,
                ":entry_date": &row.entry_date,
                ":quantity": &row.quantity,
                ":labor_hours": &row.labor_hours,
                ":unit_rate": &row.unit_rate,
                ":source": &row.source,
                ":source_log_id": &row.source_log_id,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn delete_entries_by_source_log(conn: &Connection, source_log_id: &str) -> AppResult<usize> {
        let deleted = conn.execute(
            "DELETE FROM productivity_entries WHERE source_log_id = :source_log_id",
            named_params! {":source_log_id": source_log_id},
        )?;
        Ok(deleted)
    }

    pub fn delete_time_entry_derived(
        conn: &Connection,
        project_id: &str,
        entry_date: &str,
    ) -> AppResult<usize> {
        let deleted = conn.execute(
            r#"
                DELETE FROM productivity_entries
                WHERE project_id = :project_id
                  AND entry_date = :entry_date
                  AND source = 'time_entry'
            "#,
            named_params! {":project_id": project_id, ":entry_date": entry_date},
        )?;
        Ok(deleted)
    }

    pub fn list_entries_by_project(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Vec<ProductivityEntryRecord>> {
        let sql = format!(
            "{ENTRY_SELECT} WHERE project_id = :project_id ORDER BY entry_date, created_at, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                ProductivityEntryRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// Replaces the analytics record for this (cost code, period) pair.
    /// Delete-then-insert keeps the pair single-source-of-truth.
    pub fn replace_analytics(conn: &Connection, row: &ProductivityAnalyticsRow) -> AppResult<()> {
        conn.execute(
            r#"
                DELETE FROM productivity_analytics
                WHERE cost_code_id = :cost_code_id AND period_type = :period_type
            "#,
            named_params! {
                ":cost_code_id": &row.cost_code_id,
                ":period_type": &row.period_type,
            },
        )?;

        conn.execute(
            r#"
                INSERT INTO productivity_analytics (
                    cost_code_id, period_type, project_id, period_end,
                    peak_unit_rate, average_unit_rate, low_unit_rate,
                    standard_deviation, total_labor_hours, total_quantity,
                    cost_variance, schedule_variance_days, planned_vs_actual_variance
                ) VALUES (
                    :cost_code_id, :period_type, :project_id, :period_end,
                    :peak_unit_rate, :average_unit_rate, :low_unit_rate,
                    :standard_deviation, :total_labor_hours, :total_quantity,
                    :cost_variance, :schedule_variance_days, :planned_vs_actual_variance
                )
            "#,
            named_params! {
                ":cost_code_id": &row.cost_code_id,
                ":period_type": &row.period_type,
                ":project_id": &row.project_id,
                ":period_end": &row.period_end,
                ":peak_unit_rate": &row.peak_unit_rate,
                ":average_unit_rate": &row.average_unit_rate,
                ":low_unit_rate": &row.low_unit_rate,
                ":standard_deviation": &row.standard_deviation,
                ":total_labor_hours": &row.total_labor_hours,
                ":total_quantity": &row.total_quantity,
                ":cost_variance": &row.cost_variance,
                ":schedule_variance_days": &row.schedule_variance_days,
                ":planned_vs_actual_variance": &row.planned_vs_actual_variance,
            },
        )?;

        Ok(())
    }

    pub fn delete_analytics(
        conn: &Connection,
        cost_code_id: &str,
        period_type: PeriodType,
    ) -> AppResult<usize> {
        let deleted = conn.execute(
            r#"
                DELETE FROM productivity_analytics
                WHERE cost_code_id = :cost_code_id AND period_type = :period_type
            "#,
            named_params! {
                ":cost_code_id": cost_code_id,
                ":period_type": period_type.as_str(),
            },
        )?;
        Ok(deleted)
    }

    pub fn list_analytics_by_project(
        conn: &Connection,
        project_id: &str,
        period_type: PeriodType,
    ) -> AppResult<Vec<ProductivityAnalyticsRecord>> {
        let sql = format!(
            "{ANALYTICS_SELECT} WHERE project_id = :project_id AND period_type = :period_type ORDER BY cost_code_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":project_id": project_id,
                    ":period_type": period_type.as_str(),
                },
                |row| ProductivityAnalyticsRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
