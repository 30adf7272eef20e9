use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::info;

use crate::db::repositories::cost_code_repository::CostCodeRepository;
use crate::db::repositories::productivity_repository::{
    ProductivityAnalyticsRow, ProductivityRepository,
};
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::productivity::{
    PeriodType, ProductivityAnalyticsRecord, ProductivityEntryRecord, RecomputeOutcome,
};
use crate::models::settings::EngineSettingsRecord;
use crate::services::settings_service::SettingsService;

/// Recomputes per-cost-code statistics from the current productivity
/// entries. Idempotent: each (cost code, period) record is replaced
/// wholesale, and unchanged inputs reproduce it exactly.
pub struct AnalyticsService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl AnalyticsService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    /// Refreshes the project-to-date analytics of every cost code with at
    /// least one productivity entry, then clears stale records for cost
    /// codes whose entries are gone. One cost code's replacement completes
    /// before the next begins; the refresh as a whole is not transactional,
    /// and an error leaves already-committed replacements in place.
    pub fn recompute_analytics(&self, project_id: &str) -> AppResult<RecomputeOutcome> {
        let settings = self.settings.get()?;

        let entries = self
            .db
            .with_connection(|conn| ProductivityRepository::list_entries_by_project(conn, project_id))?;
        let baselines: HashMap<String, f64> = self
            .db
            .with_connection(|conn| CostCodeRepository::list_baselines_by_project(conn, project_id))?
            .into_iter()
            .map(|baseline| (baseline.cost_code_id, baseline.baseline_unit_rate))
            .collect();

        let mut grouped: BTreeMap<String, Vec<&ProductivityEntryRecord>> = BTreeMap::new();
        for entry in &entries {
            grouped
                .entry(entry.cost_code_id.clone())
                .or_default()
                .push(entry);
        }

        for (cost_code_id, code_entries) in &grouped {
            let baseline = baselines.get(cost_code_id).copied();
            let record = build_analytics_record(
                project_id,
                cost_code_id,
                code_entries,
                baseline,
                &settings,
            );
            let row = ProductivityAnalyticsRow::from_record(&record);
            self.db
                .with_connection(|conn| ProductivityRepository::replace_analytics(conn, &row))?;
        }

        let mut cleared = 0usize;
        let existing = self.db.with_connection(|conn| {
            ProductivityRepository::list_analytics_by_project(conn, project_id, PeriodType::ProjectToDate)
        })?;
        for record in existing {
            if !grouped.contains_key(&record.cost_code_id) {
                self.db.with_connection(|conn| {
                    ProductivityRepository::delete_analytics(
                        conn,
                        &record.cost_code_id,
                        PeriodType::ProjectToDate,
                    )
                })?;
                cleared += 1;
            }
        }

        info!(
            target: "app::analytics",
            project_id,
            cost_codes_updated = grouped.len(),
            cost_codes_cleared = cleared,
            entries_considered = entries.len(),
            "productivity analytics recomputed"
        );

        Ok(RecomputeOutcome {
            cost_codes_updated: grouped.len(),
            cost_codes_cleared: cleared,
            entries_considered: entries.len(),
        })
    }

    pub fn list_analytics(
        &self,
        project_id: &str,
    ) -> AppResult<Vec<ProductivityAnalyticsRecord>> {
        self.db.with_connection(|conn| {
            ProductivityRepository::list_analytics_by_project(conn, project_id, PeriodType::ProjectToDate)
        })
    }
}

fn build_analytics_record(
    project_id: &str,
    cost_code_id: &str,
    entries: &[&ProductivityEntryRecord],
    baseline: Option<f64>,
    settings: &EngineSettingsRecord,
) -> ProductivityAnalyticsRecord {
    let rates: Vec<f64> = entries.iter().map(|entry| entry.unit_rate).collect();
    let peak_unit_rate = rates.iter().copied().fold(f64::MIN, f64::max);
    let low_unit_rate = rates.iter().copied().fold(f64::MAX, f64::min);
    let average_unit_rate = mean(&rates);
    let standard_deviation = sample_std_dev(&rates);

    let total_labor_hours: f64 = entries.iter().map(|entry| entry.labor_hours).sum();
    let total_quantity: f64 = entries.iter().map(|entry| entry.quantity).sum();

    // Entries arrive date-ordered from the repository.
    let period_end = entries
        .last()
        .map(|entry| entry.entry_date.clone())
        .unwrap_or_default();

    let baseline = baseline.filter(|rate| *rate > 0.0);
    let (cost_variance, schedule_variance_days, planned_vs_actual_variance) = match baseline {
        Some(baseline_rate) => {
            let planned_hours = total_quantity / baseline_rate;
            // Positive cost variance = under budget; negative schedule
            // variance = ahead of plan.
            let cost_variance = (planned_hours - total_labor_hours) * settings.average_labor_rate;
            let schedule_variance_days =
                (total_labor_hours - planned_hours) / settings.crew_hours_per_day;
            let planned_vs_actual =
                ((average_unit_rate - baseline_rate) / baseline_rate) * 100.0;
            (
                Some(cost_variance),
                Some(schedule_variance_days),
                Some(planned_vs_actual),
            )
        }
        None => (None, None, None),
    };

    ProductivityAnalyticsRecord {
        project_id: project_id.to_string(),
        cost_code_id: cost_code_id.to_string(),
        period_type: PeriodType::ProjectToDate,
        period_end,
        peak_unit_rate,
        average_unit_rate,
        low_unit_rate,
        standard_deviation,
        total_labor_hours,
        total_quantity,
        cost_variance,
        schedule_variance_days,
        planned_vs_actual_variance,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (N-1 denominator); 0.0 for a single value.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let average = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::productivity::EntrySource;

    fn entry(cost_code_id: &str, date: &str, quantity: f64, labor_hours: f64) -> ProductivityEntryRecord {
        ProductivityEntryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: "proj-1".to_string(),
            cost_code_id: cost_code_id.to_string(),
            entry_date: date.to_string(),
            quantity,
            labor_hours,
            unit_rate: quantity / labor_hours,
            source: EntrySource::DailyLog,
            source_log_id: None,
            created_at: "2024-03-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn sample_std_dev_of_single_value_is_zero() {
        assert_eq!(sample_std_dev(&[42.0]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        // Values 8 and 12: variance (2^2 + 2^2) / 1 = 8, stddev = sqrt(8).
        let std_dev = sample_std_dev(&[8.0, 12.0]);
        assert!((std_dev - 8.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn analytics_record_without_baseline_has_null_variances() {
        let entries = vec![entry("cc-1", "2024-03-01", 80.0, 10.0)];
        let refs: Vec<&ProductivityEntryRecord> = entries.iter().collect();
        let record = build_analytics_record(
            "proj-1",
            "cc-1",
            &refs,
            None,
            &EngineSettingsRecord::default(),
        );

        assert_eq!(record.average_unit_rate, 8.0);
        assert!(record.cost_variance.is_none());
        assert!(record.schedule_variance_days.is_none());
        assert!(record.planned_vs_actual_variance.is_none());
    }

    #[test]
    fn variance_signs_follow_the_dashboard_conventions() {
        // Baseline 10 u/h, 200 units installed in 25 hours (8 u/h actual):
        // planned 20 hours, so 5 hours over -> over budget (negative cost
        // variance) and behind plan (positive schedule variance).
        let entries = vec![
            entry("cc-1", "2024-03-01", 100.0, 12.5),
            entry("cc-1", "2024-03-02", 100.0, 12.5),
        ];
        let refs: Vec<&ProductivityEntryRecord> = entries.iter().collect();
        let settings = EngineSettingsRecord::default();
        let record = build_analytics_record("proj-1", "cc-1", &refs, Some(10.0), &settings);

        let cost_variance = record.cost_variance.expect("cost variance");
        let schedule_variance = record.schedule_variance_days.expect("schedule variance");
        assert!((cost_variance - (-5.0 * settings.average_labor_rate)).abs() < 1e-9);
        assert!((schedule_variance - (5.0 / settings.crew_hours_per_day)).abs() < 1e-9);

        let pva = record.planned_vs_actual_variance.expect("variance pct");
        assert!((pva - (-20.0)).abs() < 1e-9);
        assert_eq!(record.period_end, "2024-03-02");
    }
}
