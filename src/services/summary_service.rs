use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::db::repositories::cost_code_repository::{CostCodeRepository, CostCodeRow};
use crate::db::repositories::productivity_repository::ProductivityRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::cost_code::CostCodeRecord;
use crate::models::productivity::{PeriodType, ProductivityAnalyticsRecord};
use crate::models::settings::EngineSettingsRecord;
use crate::models::summary::{CostCodeSummary, ProductivitySummary, TrendDirection};
use crate::services::settings_service::SettingsService;

/// Read-only view assembler: joins the cost code registry, baselines, and
/// the latest analytics into dashboard summaries. No caching; every call
/// re-derives from whatever is currently stored.
pub struct SummaryService {
    db: DbPool,
    settings: Arc<SettingsService>,
}

impl SummaryService {
    pub fn new(db: DbPool, settings: Arc<SettingsService>) -> Self {
        Self { db, settings }
    }

    pub fn get_productivity_summary(&self, project_id: &str) -> AppResult<ProductivitySummary> {
        let settings = self.settings.get()?;

        let (cost_codes, baselines, analytics, entries) = self.db.with_connection(|conn| {
            let cost_codes: Vec<CostCodeRecord> =
                CostCodeRepository::list_by_project(conn, project_id)?
                    .into_iter()
                    .map(CostCodeRow::into_record)
                    .collect();
            let baselines = CostCodeRepository::list_baselines_by_project(conn, project_id)?;
            let analytics = ProductivityRepository::list_analytics_by_project(
                conn,
                project_id,
                PeriodType::ProjectToDate,
            )?;
            let entries = ProductivityRepository::list_entries_by_project(conn, project_id)?;
            Ok((cost_codes, baselines, analytics, entries))
        })?;

        let baselines: HashMap<String, f64> = baselines
            .into_iter()
            .map(|baseline| (baseline.cost_code_id, baseline.baseline_unit_rate))
            .collect();
        let analytics: HashMap<String, ProductivityAnalyticsRecord> = analytics
            .into_iter()
            .map(|record| (record.cost_code_id.clone(), record))
            .collect();

        // Entries come back date-ordered; group their rates per cost code
        // for trend classification.
        let mut rates_by_code: HashMap<String, Vec<f64>> = HashMap::new();
        for entry in &entries {
            rates_by_code
                .entry(entry.cost_code_id.clone())
                .or_default()
                .push(entry.unit_rate);
        }

        let summaries: Vec<CostCodeSummary> = cost_codes
            .into_iter()
            .map(|cost_code| {
                let baseline = baselines.get(&cost_code.id).copied();
                let code_analytics = analytics.get(&cost_code.id);
                let rates = rates_by_code
                    .get(&cost_code.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                build_cost_code_summary(cost_code, baseline, code_analytics, rates, &settings)
            })
            .collect();

        let indices: Vec<f64> = summaries
            .iter()
            .filter_map(|summary| summary.productivity_index)
            .collect();
        let overall_productivity_index = if indices.is_empty() {
            None
        } else {
            Some(round_to(mean(&indices), 1000.0))
        };
        let at_risk_count = summaries.iter().filter(|summary| summary.is_at_risk).count();

        debug!(
            target: "app::summary",
            project_id,
            cost_codes = summaries.len(),
            at_risk_count,
            "productivity summary assembled"
        );

        Ok(ProductivitySummary {
            project_id: project_id.to_string(),
            cost_codes: summaries,
            overall_productivity_index,
            at_risk_count,
            generated_at: Utc::now().to_rfc3339(),
        })
    }
}

fn build_cost_code_summary(
    cost_code: CostCodeRecord,
    baseline: Option<f64>,
    analytics: Option<&ProductivityAnalyticsRecord>,
    rates: &[f64],
    settings: &EngineSettingsRecord,
) -> CostCodeSummary {
    let baseline = baseline.filter(|rate| *rate > 0.0);
    let current_unit_rate = analytics
        .map(|record| record.average_unit_rate)
        .unwrap_or(0.0);
    let total_quantity_installed = analytics
        .map(|record| record.total_quantity)
        .unwrap_or(0.0);
    let total_labor_hours = analytics
        .map(|record| record.total_labor_hours)
        .unwrap_or(0.0);

    let productivity_index =
        baseline.map(|baseline_rate| round_to(current_unit_rate / baseline_rate, 1000.0));

    let percent_complete = if cost_code.budgeted_quantity > 0.0 {
        round_to(
            (total_quantity_installed / cost_code.budgeted_quantity * 100.0).clamp(0.0, 100.0),
            10.0,
        )
    } else {
        0.0
    };

    let days_behind = compute_days_behind(
        baseline,
        current_unit_rate,
        cost_code.budgeted_quantity,
        total_quantity_installed,
        settings.crew_hours_per_day,
    );

    // A cost code that is essentially complete is never flagged, whatever
    // its measured rate ended up at.
    let is_at_risk = productivity_index
        .map(|index| index < settings.at_risk_index_threshold)
        .unwrap_or(false)
        && percent_complete < settings.complete_pct_threshold;

    let trend_direction = classify_trend(rates, settings.trend_window, settings.trend_stable_band_pct);

    CostCodeSummary {
        cost_code,
        baseline_unit_rate: baseline,
        current_unit_rate,
        productivity_index,
        percent_complete,
        total_quantity_installed,
        total_labor_hours,
        days_behind,
        is_at_risk,
        trend_direction,
    }
}

/// Projected remaining days at the current rate minus the same projection
/// at the baseline rate, floored at 0 when ahead.
fn compute_days_behind(
    baseline: Option<f64>,
    current_rate: f64,
    budgeted_quantity: f64,
    installed_quantity: f64,
    crew_hours_per_day: f64,
) -> f64 {
    let baseline_rate = match baseline {
        Some(rate) if rate > 0.0 => rate,
        _ => return 0.0,
    };
    if current_rate <= 0.0 || crew_hours_per_day <= 0.0 {
        return 0.0;
    }
    let remaining = (budgeted_quantity - installed_quantity).max(0.0);
    if remaining <= 0.0 {
        return 0.0;
    }

    let behind_hours = remaining / current_rate - remaining / baseline_rate;
    round_to((behind_hours / crew_hours_per_day).max(0.0), 10.0)
}

/// Compares the mean rate of the most recent `window` entries against the
/// mean of the `window` entries preceding them. The stable band absorbs
/// noise; an empty comparison side is stable by definition.
fn classify_trend(rates: &[f64], window: usize, stable_band_pct: f64) -> TrendDirection {
    let window = window.max(1);
    if rates.len() < 2 {
        return TrendDirection::Stable;
    }

    let recent_start = rates.len().saturating_sub(window);
    let recent = &rates[recent_start..];
    let prior_start = recent_start.saturating_sub(window);
    let prior = &rates[prior_start..recent_start];

    if prior.is_empty() {
        return TrendDirection::Stable;
    }

    let prior_mean = mean(prior);
    if prior_mean <= 0.0 {
        return TrendDirection::Stable;
    }

    let delta_pct = (mean(recent) - prior_mean) / prior_mean * 100.0;
    if delta_pct > stable_band_pct {
        TrendDirection::Improving
    } else if delta_pct < -stable_band_pct {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}
