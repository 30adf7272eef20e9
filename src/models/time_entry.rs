use serde::{Deserialize, Serialize};

pub const TIME_ENTRY_STATUS_PENDING: &str = "pending";
pub const TIME_ENTRY_STATUS_APPROVED: &str = "approved";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRecord {
    pub id: String,
    pub project_id: String,
    pub worker_name: String,
    pub entry_date: String,
    pub cost_code_id: Option<String>,
    pub hours: f64,
    pub status: String,
    pub approved_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryCreateInput {
    pub project_id: String,
    pub worker_name: String,
    pub entry_date: String,
    #[serde(default)]
    pub cost_code_id: Option<String>,
    pub hours: f64,
}
