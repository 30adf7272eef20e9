use serde::{Deserialize, Serialize};

pub const LOG_STATUS_DRAFT: &str = "draft";
pub const LOG_STATUS_SUBMITTED: &str = "submitted";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogRecord {
    pub id: String,
    pub project_id: String,
    pub log_date: String,
    pub weather: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub work_performed: Vec<WorkPerformedItem>,
    pub manpower: Vec<ManpowerEntry>,
    /// References to standalone delay events observed on this date.
    pub delay_event_ids: Vec<String>,
    pub changes: Vec<ChangeEntryRecord>,
    pub conflicts: Vec<ConflictEntryRecord>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPerformedItem {
    pub id: String,
    pub cost_code_id: Option<String>,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_of_measure: Option<String>,
}

/// One crew line; contributes `workers * hours_each` labor hours to its
/// cost code's pool for the log date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManpowerEntry {
    pub id: String,
    pub cost_code_id: Option<String>,
    pub trade: String,
    pub workers: i64,
    pub hours_each: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntryRecord {
    pub id: String,
    pub daily_log_id: String,
    pub project_id: String,
    pub entry_date: String,
    pub description: String,
    pub initiated_by: Option<String>,
    pub schedule_impact_days: f64,
    pub estimated_cost_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntryRecord {
    pub id: String,
    pub daily_log_id: String,
    pub project_id: String,
    pub entry_date: String,
    pub description: String,
    pub trades_involved: Option<String>,
    pub schedule_impact_days: f64,
    pub estimated_cost_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogSaveInput {
    #[serde(default)]
    pub id: Option<String>,
    pub project_id: String,
    pub log_date: String,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub work_performed: Vec<WorkPerformedItemInput>,
    #[serde(default)]
    pub manpower: Vec<ManpowerEntryInput>,
    #[serde(default)]
    pub delay_event_ids: Vec<String>,
    #[serde(default)]
    pub changes: Vec<ChangeEntryInput>,
    #[serde(default)]
    pub conflicts: Vec<ConflictEntryInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkPerformedItemInput {
    #[serde(default)]
    pub cost_code_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManpowerEntryInput {
    #[serde(default)]
    pub cost_code_id: Option<String>,
    pub trade: String,
    pub workers: i64,
    pub hours_each: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntryInput {
    pub description: String,
    #[serde(default)]
    pub initiated_by: Option<String>,
    #[serde(default)]
    pub schedule_impact_days: Option<f64>,
    #[serde(default)]
    pub estimated_cost_impact: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntryInput {
    pub description: String,
    #[serde(default)]
    pub trades_involved: Option<String>,
    #[serde(default)]
    pub schedule_impact_days: Option<f64>,
    #[serde(default)]
    pub estimated_cost_impact: Option<f64>,
}
