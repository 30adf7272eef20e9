use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    ProjectToDate,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::ProjectToDate => "project_to_date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project_to_date" => Some(PeriodType::ProjectToDate),
            _ => None,
        }
    }
}

impl Default for PeriodType {
    fn default() -> Self {
        PeriodType::ProjectToDate
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    DailyLog,
    TimeEntry,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::DailyLog => "daily_log",
            EntrySource::TimeEntry => "time_entry",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily_log" => Some(EntrySource::DailyLog),
            "time_entry" => Some(EntrySource::TimeEntry),
            _ => None,
        }
    }
}

/// Normalized productivity measurement, derived from field records and
/// never hand-edited. `unit_rate` is quantity per labor hour; no entry
/// exists with labor_hours <= 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityEntryRecord {
    pub id: String,
    pub project_id: String,
    pub cost_code_id: String,
    pub entry_date: String,
    pub quantity: f64,
    pub labor_hours: f64,
    pub unit_rate: f64,
    pub source: EntrySource,
    pub source_log_id: Option<String>,
    pub created_at: String,
}

/// Aggregated statistics for one (cost code, period) pair. Keyed by that
/// pair; the aggregator replaces the record wholesale on every recompute,
/// and the record carries no wall-clock column so an unchanged input set
/// reproduces it exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityAnalyticsRecord {
    pub project_id: String,
    pub cost_code_id: String,
    pub period_type: PeriodType,
    pub period_end: String,
    pub peak_unit_rate: f64,
    pub average_unit_rate: f64,
    pub low_unit_rate: f64,
    pub standard_deviation: f64,
    pub total_labor_hours: f64,
    pub total_quantity: f64,
    pub cost_variance: Option<f64>,
    pub schedule_variance_days: Option<f64>,
    pub planned_vs_actual_variance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationOutcome {
    pub derived_entries: usize,
    pub skipped_items: usize,
    pub removed_entries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeOutcome {
    pub cost_codes_updated: usize,
    pub cost_codes_cleared: usize,
    pub entries_considered: usize,
}
