use serde::{Deserialize, Serialize};

/// Schedule-impacting delay, captured on its own screen. Daily logs
/// corroborate a delay by referencing its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DelayEventRecord {
    pub id: String,
    pub project_id: String,
    pub event_date: String,
    pub description: String,
    pub responsible_party: Option<String>,
    pub delay_hours: f64,
    pub cost_impact: f64,
    pub notice_sent_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DelayEventCreateInput {
    pub project_id: String,
    pub event_date: String,
    pub description: String,
    #[serde(default)]
    pub responsible_party: Option<String>,
    #[serde(default)]
    pub delay_hours: Option<f64>,
    #[serde(default)]
    pub cost_impact: Option<f64>,
    #[serde(default)]
    pub notice_sent_date: Option<String>,
}
