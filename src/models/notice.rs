use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeLogRecord {
    pub id: String,
    pub project_id: String,
    pub notice_type: String,
    pub subject: Option<String>,
    pub date_sent: String,
    pub related_delay_event_ids: Vec<String>,
    pub related_change_ids: Vec<String>,
    pub related_daily_log_ids: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCreateInput {
    pub project_id: String,
    pub notice_type: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub date_sent: String,
    #[serde(default)]
    pub related_delay_event_ids: Vec<String>,
    #[serde(default)]
    pub related_change_ids: Vec<String>,
    #[serde(default)]
    pub related_daily_log_ids: Vec<String>,
}
