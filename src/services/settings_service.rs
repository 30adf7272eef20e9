use chrono::Utc;
use tracing::info;

use crate::db::repositories::settings_repository::SettingsRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::settings::{EngineSettingsRecord, EngineSettingsUpdateInput};

/// Engine thresholds (labor rate, crew hours, at-risk cutoffs, trend
/// window). Stored as a singleton row; defaults are written on first read.
#[derive(Clone)]
pub struct SettingsService {
    db: DbPool,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn get(&self) -> AppResult<EngineSettingsRecord> {
        if let Some(record) = self.db.with_connection(SettingsRepository::find)? {
            return Ok(record);
        }

        let mut defaults = EngineSettingsRecord::default();
        defaults.updated_at = Utc::now().to_rfc3339();
        self.db
            .with_connection(|conn| SettingsRepository::upsert(conn, &defaults))?;
        info!(target: "app::settings", "engine settings initialized with defaults");
        Ok(defaults)
    }

    pub fn update(&self, input: EngineSettingsUpdateInput) -> AppResult<EngineSettingsRecord> {
        let mut record = self.get()?;

        if let Some(value) = input.average_labor_rate {
            record.average_labor_rate = require_positive(value, "averageLaborRate")?;
        }
        if let Some(value) = input.crew_hours_per_day {
            record.crew_hours_per_day = require_positive(value, "crewHoursPerDay")?;
        }
        if let Some(value) = input.at_risk_index_threshold {
            record.at_risk_index_threshold = require_positive(value, "atRiskIndexThreshold")?;
        }
        if let Some(value) = input.complete_pct_threshold {
            if !(0.0..=100.0).contains(&value) {
                return Err(AppError::validation(
                    "completePctThreshold must be between 0 and 100",
                ));
            }
            record.complete_pct_threshold = value;
        }
        if let Some(value) = input.trend_window {
            if value == 0 {
                return Err(AppError::validation("trendWindow must be at least 1"));
            }
            record.trend_window = value;
        }
        if let Some(value) = input.trend_stable_band_pct {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::validation(
                    "trendStableBandPct must be zero or positive",
                ));
            }
            record.trend_stable_band_pct = value;
        }

        record.updated_at = Utc::now().to_rfc3339();
        self.db
            .with_connection(|conn| SettingsRepository::upsert(conn, &record))?;
        info!(target: "app::settings", "engine settings updated");
        Ok(record)
    }
}

fn require_positive(value: f64, field: &str) -> AppResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AppError::validation(format!("{field} must be positive")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_service() -> (SettingsService, tempfile::TempDir) {
        let dir = tempdir().expect("create temp dir");
        let pool = DbPool::new(dir.path().join("settings.sqlite")).expect("create db pool");
        (SettingsService::new(pool), dir)
    }

    #[test]
    fn defaults_load_on_first_access() {
        let (service, _dir) = create_service();
        let settings = service.get().expect("settings");
        assert_eq!(settings.crew_hours_per_day, 8.0);
        assert_eq!(settings.at_risk_index_threshold, 0.85);
        assert_eq!(settings.trend_window, 5);
    }

    #[test]
    fn update_round_trips_and_validates() {
        let (service, _dir) = create_service();
        let updated = service
            .update(EngineSettingsUpdateInput {
                average_labor_rate: Some(92.5),
                trend_window: Some(7),
                ..Default::default()
            })
            .expect("update settings");
        assert_eq!(updated.average_labor_rate, 92.5);
        assert_eq!(updated.trend_window, 7);

        let reloaded = service.get().expect("reload");
        assert_eq!(reloaded.average_labor_rate, 92.5);

        let rejected = service.update(EngineSettingsUpdateInput {
            crew_hours_per_day: Some(0.0),
            ..Default::default()
        });
        assert!(rejected.is_err());
    }
}
