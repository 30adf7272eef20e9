use serde::{Deserialize, Serialize};

use crate::models::cost_code::CostCodeRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Per-cost-code dashboard row. Recomputed on every read; `productivity_index`
/// is None whenever the cost code has no baseline, never a numeric default.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCodeSummary {
    pub cost_code: CostCodeRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_unit_rate: Option<f64>,
    pub current_unit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub productivity_index: Option<f64>,
    pub percent_complete: f64,
    pub total_quantity_installed: f64,
    pub total_labor_hours: f64,
    pub days_behind: f64,
    pub is_at_risk: bool,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivitySummary {
    pub project_id: String,
    pub cost_codes: Vec<CostCodeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_productivity_index: Option<f64>,
    pub at_risk_count: usize,
    pub generated_at: String,
}
