use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::cost_code::{CostCodeRecord, ProductivityBaselineRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        project_id,
        code,
        csi_division,
        description,
        budgeted_quantity,
        unit_of_measure,
        created_at,
        updated_at
    FROM cost_codes
"#;

#[derive(Debug, Clone)]
pub struct CostCodeRow {
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

impl CostCodeRow {
    pub fn from_record(record: &CostCodeRecord) -> Self {
        Self {
            id: record.id.clone(),
            project_id: record.project_id.clone(),
            code: record.code.clone(),
            csi_division: record.csi_division.clone(),
            description: record.description.clone(),
            budgeted_quantity: record.budgeted_quantity,
            unit_of_measure: record.unit_of_measure.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> CostCodeRecord {
        CostCodeRecord {
            id: self.id,
            project_id: self.project_id,
            code: self.code,
            csi_division: self.csi_division,
            description: self.description,
            budgeted_quantity: self.budgeted_quantity,
            unit_of_measure: self.unit_of_measure,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for CostCodeRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            code: row.get("code")?,
            csi_division: row.get("csi_division")?,
            description: row.get("description")?,
            budgeted_quantity: row.get("budgeted_quantity")?,
            unit_of_measure: row.get("unit_of_measure")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct CostCodeRepository;

impl CostCodeRepository {
    pub fn insert(conn: &Connection, row: &CostCodeRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO cost_codes (
                    id,
                    project_id,
                    code,
                    csi_division,
                    description,
                    budgeted_quantity,
                    unit_of_measure,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :project_id,
                    :code,
                    :csi_division,
                    :description,
                    :budgeted_quantity,
                    :unit_of_measure,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":project_id": &row.project_id,
                ":code": &row.code,
                ":csi_division": &row.csi_division,
                ":description": &row.description,
                ":budgeted_quantity": &row.budgeted_quantity,
                ":unit_of_measure": &row.unit_of_measure,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<CostCodeRow>> {
        let sql = format!("{BASE_SELECT} WHERE id = :id");
        let mut stmt = conn.prepare(&sql)?;
        let row = stmt
            .query_row(named_params! {":id": id}, |row| CostCodeRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_by_project(conn: &Connection, project_id: &str) -> AppResult<Vec<CostCodeRow>> {
        let sql = format!("{BASE_SELECT} WHERE project_id = :project_id ORDER BY code");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                CostCodeRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn upsert_baseline(
        conn: &Connection,
        cost_code_id: &str,
        baseline_unit_rate: f64,
        set_at: &str,
    ) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO productivity_baselines (cost_code_id, baseline_unit_rate, set_at)
                VALUES (:cost_code_id, :baseline_unit_rate, :set_at)
                ON CONFLICT(cost_code_id) DO UPDATE SET
                    baseline_unit_rate = excluded.baseline_unit_rate,
                    set_at = excluded.set_at
            "#,
            named_params! {
                ":cost_code_id": cost_code_id,
                ":baseline_unit_rate": baseline_unit_rate,
                ":set_at": set_at,
            },
        )?;

        Ok(())
    }

    pub fn find_baseline(
        conn: &Connection,
        cost_code_id: &str,
    ) -> AppResult<Option<ProductivityBaselineRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT cost_code_id, baseline_unit_rate, set_at
                FROM productivity_baselines
                WHERE cost_code_id = :cost_code_id
            "#,
        )?;

        let record = stmt
            .query_row(named_params! {":cost_code_id": cost_code_id}, |row| {
                Ok(ProductivityBaselineRecord {
                    cost_code_id: row.get("cost_code_id")?,
                    baseline_unit_rate: row.get("baseline_unit_rate")?,
                    set_at: row.get("set_at")?,
                })
            })
            .optional()?;

        Ok(record)
    }

    pub fn list_baselines_by_project(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Vec<ProductivityBaselineRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT b.cost_code_id, b.baseline_unit_rate, b.set_at
                FROM productivity_baselines b
                JOIN cost_codes c ON c.id = b.cost_code_id
                WHERE c.project_id = :project_id
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":project_id": project_id}, |row| {
                Ok(ProductivityBaselineRecord {
                    cost_code_id: row.get("cost_code_id")?,
                    baseline_unit_rate: row.get("baseline_unit_rate")?,
                    set_at: row.get("set_at")?,
                })
            })?
            .map(|row| row.map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
