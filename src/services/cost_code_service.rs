use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::cost_code_repository::{CostCodeRepository, CostCodeRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::cost_code::{
    BaselineSetInput, CostCodeCreateInput, CostCodeRecord, ProductivityBaselineRecord,
};

#[derive(Clone)]
pub struct CostCodeService {
    db: DbPool,
}

impl CostCodeService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_cost_code(&self, input: CostCodeCreateInput) -> AppResult<CostCodeRecord> {
        let code = input.code.trim().to_string();
        if code.is_empty() {
            return Err(AppError::validation("cost code must not be empty"));
        }
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::validation("description must not be empty"));
        }
        let unit_of_measure = input.unit_of_measure.trim().to_string();
        if unit_of_measure.is_empty() {
            return Err(AppError::validation("unit of measure must not be empty"));
        }
        let budgeted_quantity = input.budgeted_quantity.unwrap_or(0.0);
        if !budgeted_quantity.is_finite() || budgeted_quantity < 0.0 {
            return Err(AppError::validation(
                "budgeted quantity must be zero or positive",
            ));
        }

        let now = Utc::now().to_rfc3339();
        let record = CostCodeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: input.project_id,
            code,
            csi_division: input
                .csi_division
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            description,
            budgeted_quantity,
            unit_of_measure,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = CostCodeRow::from_record(&record);
        self.db
            .with_connection(|conn| CostCodeRepository::insert(conn, &row))?;
        info!(target: "app::registry", cost_code_id = %record.id, code = %record.code, "cost code created");
        Ok(record)
    }

    pub fn list_cost_codes(&self, project_id: &str) -> AppResult<Vec<CostCodeRecord>> {
        let rows = self
            .db
            .with_connection(|conn| CostCodeRepository::list_by_project(conn, project_id))?;
        let records: Vec<CostCodeRecord> = rows.into_iter().map(CostCodeRow::into_record).collect();
        debug!(target: "app::registry", count = records.len(), "cost codes listed");
        Ok(records)
    }

    pub fn get_cost_code(&self, id: &str) -> AppResult<CostCodeRecord> {
        let row = self
            .db
            .with_connection(|conn| CostCodeRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        Ok(row.into_record())
    }

    /// Sets the planned unit rate for a cost code. Set once from the
    /// estimate and read by every baseline-relative computation; never
    /// auto-mutated by the engine.
    pub fn set_baseline(&self, input: BaselineSetInput) -> AppResult<ProductivityBaselineRecord> {
        if !input.baseline_unit_rate.is_finite() || input.baseline_unit_rate <= 0.0 {
            return Err(AppError::validation("baseline unit rate must be positive"));
        }

        // The cost code must exist before a baseline can reference it.
        self.get_cost_code(&input.cost_code_id)?;

        let set_at = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            CostCodeRepository::upsert_baseline(
                conn,
                &input.cost_code_id,
                input.baseline_unit_rate,
                &set_at,
            )
        })?;
        info!(
            target: "app::registry",
            cost_code_id = %input.cost_code_id,
            baseline_unit_rate = input.baseline_unit_rate,
            "productivity baseline set"
        );

        Ok(ProductivityBaselineRecord {
            cost_code_id: input.cost_code_id,
            baseline_unit_rate: input.baseline_unit_rate,
            set_at,
        })
    }

    pub fn get_baseline(
        &self,
        cost_code_id: &str,
    ) -> AppResult<Option<ProductivityBaselineRecord>> {
        self.db
            .with_connection(|conn| CostCodeRepository::find_baseline(conn, cost_code_id))
    }
}
