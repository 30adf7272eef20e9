use serde::{Deserialize, Serialize};

use crate::models::notice::NoticeLogRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    DelayEvent,
    ChangeOrder,
    Conflict,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::DelayEvent => "delay_event",
            TriggerKind::ChangeOrder => "change_order",
            TriggerKind::Conflict => "conflict",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CausationChainFilter {
    All,
    HasNotices,
    MissingNotices,
}

impl Default for CausationChainFilter {
    fn default() -> Self {
        CausationChainFilter::All
    }
}

/// Flattened view of the trigger record at the head of a chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub id: String,
    pub kind: TriggerKind,
    pub date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<String>,
    pub cost_impact: f64,
    pub schedule_impact_days: f64,
    /// Parent log for log-embedded triggers; absent for standalone delays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_log_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedLogRef {
    pub daily_log_id: String,
    pub log_date: String,
    pub status: String,
}

/// Before/after split of measured unit rates around the trigger. Only
/// produced when both sides have entries and the project tracks baselines;
/// a post-event rate gain reports 0% loss, never negative.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityImpact {
    pub split_date: String,
    pub before_average_rate: f64,
    pub after_average_rate: f64,
    pub productivity_loss_pct: f64,
    pub entries_before: usize,
    pub entries_after: usize,
}

/// Evidentiary trail for one schedule-impacting event: trigger →
/// documentation → notice → measured impact → damages. Rebuilt from current
/// records on every request, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CausationChain {
    pub id: String,
    pub trigger_id: String,
    pub kind: TriggerKind,
    pub trigger: TriggerEvent,
    pub related_logs: Vec<RelatedLogRef>,
    pub notices: Vec<NoticeLogRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub productivity_impact: Option<ProductivityImpact>,
    pub estimated_cost_impact: f64,
    pub completeness_score: u8,
}
