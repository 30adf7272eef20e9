use serde::{Deserialize, Serialize};

/// Engine thresholds. These are tunable defaults, not fixed contracts, so
/// they live in a settings row instead of constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettingsRecord {
    pub average_labor_rate: f64,
    pub crew_hours_per_day: f64,
    pub at_risk_index_threshold: f64,
    pub complete_pct_threshold: f64,
    pub trend_window: usize,
    pub trend_stable_band_pct: f64,
    pub updated_at: String,
}

impl Default for EngineSettingsRecord {
    fn default() -> Self {
        Self {
            average_labor_rate: 75.0,
            crew_hours_per_day: 8.0,
            at_risk_index_threshold: 0.85,
            complete_pct_threshold: 95.0,
            trend_window: 5,
            trend_stable_band_pct: 3.0,
            updated_at: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettingsUpdateInput {
    #[serde(default)]
    pub average_labor_rate: Option<f64>,
    #[serde(default)]
    pub crew_hours_per_day: Option<f64>,
    #[serde(default)]
    pub at_risk_index_threshold: Option<f64>,
    #[serde(default)]
    pub complete_pct_threshold: Option<f64>,
    #[serde(default)]
    pub trend_window: Option<usize>,
    #[serde(default)]
    pub trend_stable_band_pct: Option<f64>,
}
