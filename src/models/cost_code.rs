use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostCodeRecord {
    pub id: String,
    pub project_id: String,
    pub code: String,
    pub csi_division: Option<String>,
    pub description: String,
    pub budgeted_quantity: f64,
    pub unit_of_measure: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CostCodeCreateInput {
    pub project_id: String,
    pub code: String,
    #[serde(default)]
    pub csi_division: Option<String>,
    pub description: String,
    #[serde(default)]
    pub budgeted_quantity: Option<f64>,
    pub unit_of_measure: String,
}

/// Planned unit rate for a cost code. At most one active baseline per cost
/// code; every baseline-relative metric is null while this is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityBaselineRecord {
    pub cost_code_id: String,
    pub baseline_unit_rate: f64,
    pub set_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSetInput {
    pub cost_code_id: String,
    pub baseline_unit_rate: f64,
}
