use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::settings::EngineSettingsRecord;

const SETTINGS_ID: &str = "default";

#[derive(Debug, Clone)]
pub struct EngineSettingsRow {
    pub average_labor_rate: f64,
    pub crew_hours_per_day: f64,
    pub at_risk_index_threshold: f64,
    pub complete_pct_threshold: f64,
    pub trend_window: i64,
    pub trend_stable_band_pct: f64,
    pub updated_at: String,
}

impl EngineSettingsRow {
    pub fn from_record(record: &EngineSettingsRecord) -> Self {
        Self {
            average_labor_rate: record.average_labor_rate,
            crew_hours_per_day: record.crew_hours_per_day,
            at_risk_index_threshold: record.at_risk_index_threshold,
            complete_pct_threshold: record.complete_pct_threshold,
            trend_window: record.trend_window as i64,
            trend_stable_band_pct: record.trend_stable_band_pct,
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> EngineSettingsRecord {
        EngineSettingsRecord {
            average_labor_rate: self.average_labor_rate,
            crew_hours_per_day: self.crew_hours_per_day,
            at_risk_index_threshold: self.at_risk_index_threshold,
            complete_pct_threshold: self.complete_pct_threshold,
            trend_window: self.trend_window.max(1) as usize,
            trend_stable_band_pct: self.trend_stable_band_pct,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for EngineSettingsRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            average_labor_rate: row.get("average_labor_rate")?,
            crew_hours_per_day: row.get("crew_hours_per_day")?,
            at_risk_index_threshold: row.get("at_risk_index_threshold")?,
            complete_pct_threshold: row.get("complete_pct_threshold")?,
            trend_window: row.get("trend_window")?,
            trend_stable_band_pct: row.get("trend_stable_band_pct")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct SettingsRepository;

impl SettingsRepository {
    pub fn find(conn: &Connection) -> AppResult<Option<EngineSettingsRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    average_labor_rate,
                    crew_hours_per_day,
                    at_risk_index_threshold,
                    complete_pct_threshold,
                    trend_window,
                    trend_stable_band_pct,
                    updated_at
                FROM engine_settings
                WHERE id = :id
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":id": SETTINGS_ID}, |row| {
                EngineSettingsRow::try_from(row)
            })
            .optional()?;

        Ok(row.map(EngineSettingsRow::into_record))
    }

    pub fn upsert(conn: &Connection, record: &EngineSettingsRecord) -> AppResult<()> {
        let row = EngineSettingsRow::from_record(record);
        conn.execute(
            r#"
                INSERT INTO engine_settings (
                    id, average_labor_rate, crew_hours_per_day, at_risk_index_threshold,
                    complete_pct_threshold, trend_window, trend_stable_band_pct, updated_at
                ) VALUES (
                    :id, :average_labor_rate, :crew_hours_per_day, :at_risk_index_threshold,
                    :complete_pct_threshold, :trend_window, :trend_stable_band_pct, :updated_at
                )
                ON CONFLICT(id) DO UPDATE SET
                    average_labor_rate = excluded.average_labor_rate,
                    crew_hours_per_day = excluded.crew_hours_per_day,
                    at_risk_index_threshold = excluded.at_risk_index_threshold,
                    complete_pct_threshold = excluded.complete_pct_threshold,
                    trend_window = excluded.trend_window,
                    trend_stable_band_pct = excluded.trend_stable_band_pct,
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":id": SETTINGS_ID,
                ":average_labor_rate": &row.average_labor_rate,
                ":crew_hours_per_day": &row.crew_hours_per_day,
                ":at_risk_index_threshold": &row.at_risk_index_threshold,
                ":complete_pct_threshold": &row.complete_pct_threshold,
                ":trend_window": &row.trend_window,
                ":trend_stable_band_pct": &row.trend_stable_band_pct,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }
}
