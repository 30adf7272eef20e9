use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::daily_log_repository::DailyLogRepository;
use crate::db::repositories::productivity_repository::{
    ProductivityEntryRow, ProductivityRepository,
};
use crate::db::repositories::time_entry_repository::TimeEntryRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::daily_log::{ManpowerEntry, WorkPerformedItem};
use crate::models::productivity::{DerivationOutcome, EntrySource, ProductivityEntryRecord};

/// Turns raw field records into normalized productivity entries. Entries
/// are append-only and derived; re-deriving a source first removes what it
/// produced earlier so an edited log never duplicates.
#[derive(Clone)]
pub struct DerivationService {
    db: DbPool,
}

impl DerivationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Derives productivity entries from one saved daily log. One entry per
    /// work-performed line that has a cost code, a positive quantity, and
    /// attributable crew hours; everything else is skipped, never written
    /// as a zero entry.
    pub fn derive_from_daily_log(
        &self,
        project_id: &str,
        daily_log_id: &str,
    ) -> AppResult<DerivationOutcome> {
        self.db.with_connection(|conn| {
            let log = DailyLogRepository::find_by_id(conn, daily_log_id)?
                .ok_or_else(AppError::not_found)?;
            if log.project_id != project_id {
                return Err(AppError::validation(
                    "daily log does not belong to this project",
                ));
            }

            let removed = ProductivityRepository::delete_entries_by_source_log(conn, &log.id)?;

            let crew_hours = crew_hours_by_cost_code(&log.manpower);
            let quantity_totals = quantity_by_cost_code(&log.work_performed);

            let now = Utc::now().to_rfc3339();
            let mut derived = 0usize;
            let mut skipped = 0usize;

            for item in &log.work_performed {
                let (cost_code_id, quantity) = match (item.cost_code_id.as_deref(), item.quantity) {
                    (Some(code), Some(quantity)) if quantity > 0.0 => (code, quantity),
                    _ => {
                        skipped += 1;
                        continue;
                    }
                };

                let pool = crew_hours.get(cost_code_id).copied().unwrap_or(0.0);
                let code_quantity = quantity_totals.get(cost_code_id).copied().unwrap_or(0.0);
                let labor_hours = apportion_hours(pool, quantity, code_quantity);
                if labor_hours <= 0.0 {
                    debug!(
                        target: "app::derivation",
                        daily_log_id = %log.id,
                        cost_code_id,
                        "work item skipped: no attributable crew hours"
                    );
                    skipped += 1;
                    continue;
                }

                let record = ProductivityEntryRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    project_id: log.project_id.clone(),
                    cost_code_id: cost_code_id.to_string(),
                    entry_date: log.log_date.clone(),
                    quantity,
                    labor_hours,
                    unit_rate: quantity / labor_hours,
                    source: EntrySource::DailyLog,
                    source_log_id: Some(log.id.clone()),
                    created_at: now.clone(),
                };
                ProductivityRepository::insert_entry(
                    conn,
                    &ProductivityEntryRow::from_record(&record),
                )?;
                derived += 1;
            }

            info!(
                target: "app::derivation",
                daily_log_id = %log.id,
                derived,
                skipped,
                removed,
                "productivity entries derived from daily log"
            );

            Ok(DerivationOutcome {
                derived_entries: derived,
                skipped_items: skipped,
                removed_entries: removed,
            })
        })
    }

    /// Derives productivity entries from the approved time entries of one
    /// date. Time entries supply labor hours per cost code; installed
    /// quantity comes from the same date's submitted daily logs. Pairs
    /// missing either side derive nothing.
    pub fn derive_from_time_entries(
        &self,
        project_id: &str,
        entry_date: &str,
    ) -> AppResult<DerivationOutcome> {
        let entry_date = NaiveDate::parse_from_str(entry_date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::validation(format!("invalid date: {entry_date}")))?
            .to_string();

        self.db.with_connection(|conn| {
            let approved =
                TimeEntryRepository::list_approved_by_date(conn, project_id, &entry_date)?;

            let mut hours_by_code: BTreeMap<String, f64> = BTreeMap::new();
            let mut skipped = 0usize;
            for entry in &approved {
                match entry.cost_code_id.as_deref() {
                    Some(code) if entry.hours > 0.0 => {
                        *hours_by_code.entry(code.to_string()).or_insert(0.0) += entry.hours;
                    }
                    _ => skipped += 1,
                }
            }

            let logs = DailyLogRepository::list_submitted_by_date(conn, project_id, &entry_date)?;
            let mut quantity_by_code: HashMap<String, f64> = HashMap::new();
            for log in &logs {
                for (code, quantity) in quantity_by_cost_code(&log.work_performed) {
                    *quantity_by_code.entry(code).or_insert(0.0) += quantity;
                }
            }

            let removed =
                ProductivityRepository::delete_time_entry_derived(conn, project_id, &entry_date)?;

            let now = Utc::now().to_rfc3339();
            let mut derived = 0usize;
            for (cost_code_id, labor_hours) in hours_by_code {
                let quantity = quantity_by_code
                    .get(&cost_code_id)
                    .copied()
                    .unwrap_or(0.0);
                if quantity <= 0.0 {
                    debug!(
                        target: "app::derivation",
                        entry_date = %entry_date,
                        cost_code_id = %cost_code_id,
                        "time entry hours skipped: no logged quantity for the date"
                    );
                    skipped += 1;
                    continue;
                }

                let record = ProductivityEntryRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    project_id: project_id.to_string(),
                    cost_code_id,
                    entry_date: entry_date.clone(),
                    quantity,
                    labor_hours,
                    unit_rate: quantity / labor_hours,
                    source: EntrySource::TimeEntry,
                    source_log_id: None,
                    created_at: now.clone(),
                };
                ProductivityRepository::insert_entry(
                    conn,
                    &ProductivityEntryRow::from_record(&record),
                )?;
                derived += 1;
            }

            info!(
                target: "app::derivation",
                entry_date = %entry_date,
                derived,
                skipped,
                removed,
                "productivity entries derived from time entries"
            );

            Ok(DerivationOutcome {
                derived_entries: derived,
                skipped_items: skipped,
                removed_entries: removed,
            })
        })
    }
}

/// Crew hours pooled per cost code: each manpower line contributes
/// `workers * hours_each` to its code. Lines without a cost code are left
/// out of every pool.
fn crew_hours_by_cost_code(manpower: &[ManpowerEntry]) -> HashMap<String, f64> {
    let mut pools: HashMap<String, f64> = HashMap::new();
    for entry in manpower {
        let hours = entry.workers as f64 * entry.hours_each;
        if hours <= 0.0 {
            continue;
        }
        if let Some(code) = entry.cost_code_id.as_deref() {
            *pools.entry(code.to_string()).or_insert(0.0) += hours;
        }
    }
    pools
}

fn quantity_by_cost_code(items: &[WorkPerformedItem]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for item in items {
        if let (Some(code), Some(quantity)) = (item.cost_code_id.as_deref(), item.quantity) {
            if quantity > 0.0 {
                *totals.entry(code.to_string()).or_insert(0.0) += quantity;
            }
        }
    }
    totals
}

/// Splits a cost code's crew-hour pool across its concurrent work lines
/// proportionally to quantity share.
fn apportion_hours(pool: f64, quantity: f64, code_quantity: f64) -> f64 {
    if pool <= 0.0 || quantity <= 0.0 || code_quantity <= 0.0 {
        return 0.0;
    }
    pool * (quantity / code_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manpower(code: Option<&str>, workers: i64, hours_each: f64) -> ManpowerEntry {
        ManpowerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            cost_code_id: code.map(|value| value.to_string()),
            trade: "Carpenter".to_string(),
            workers,
            hours_each,
        }
    }

    fn work_item(code: Option<&str>, quantity: Option<f64>) -> WorkPerformedItem {
        WorkPerformedItem {
            id: uuid::Uuid::new_v4().to_string(),
            cost_code_id: code.map(|value| value.to_string()),
            description: "Formwork".to_string(),
            quantity,
            unit_of_measure: Some("sf".to_string()),
        }
    }

    #[test]
    fn crew_hours_pool_multiplies_workers_by_hours() {
        let pools = crew_hours_by_cost_code(&[
            manpower(Some("cc-1"), 4, 8.0),
            manpower(Some("cc-1"), 2, 4.0),
            manpower(Some("cc-2"), 3, 8.0),
            manpower(None, 5, 8.0),
        ]);

        assert_eq!(pools.get("cc-1"), Some(&40.0));
        assert_eq!(pools.get("cc-2"), Some(&24.0));
        assert_eq!(pools.len(), 2);
    }

    #[test]
    fn apportionment_follows_quantity_share() {
        // 40 crew hours split across 300 + 100 units of the same code.
        assert_eq!(apportion_hours(40.0, 300.0, 400.0), 30.0);
        assert_eq!(apportion_hours(40.0, 100.0, 400.0), 10.0);
        assert_eq!(apportion_hours(0.0, 100.0, 400.0), 0.0);
        assert_eq!(apportion_hours(40.0, 0.0, 400.0), 0.0);
    }

    #[test]
    fn quantity_totals_ignore_missing_values() {
        let totals = quantity_by_cost_code(&[
            work_item(Some("cc-1"), Some(120.0)),
            work_item(Some("cc-1"), Some(80.0)),
            work_item(Some("cc-1"), None),
            work_item(Some("cc-2"), Some(0.0)),
            work_item(None, Some(50.0)),
        ]);

        assert_eq!(totals.get("cc-1"), Some(&200.0));
        assert!(totals.get("cc-2").is_none());
        assert_eq!(totals.len(), 1);
    }
}
