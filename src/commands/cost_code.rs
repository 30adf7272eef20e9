use tauri::State;

use crate::models::cost_code::{
    BaselineSetInput, CostCodeCreateInput, CostCodeRecord, ProductivityBaselineRecord,
};

use super::{run_blocking, AppState, CommandResult};

#[tauri::command]
pub async fn cost_codes_create(
    state: State<'_, AppState>,
    input: CostCodeCreateInput,
) -> CommandResult<CostCodeRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.cost_codes().create_cost_code(input)).await
}

#[tauri::command]
pub async fn cost_codes_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<CostCodeRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.cost_codes().list_cost_codes(&project_id)).await
}

#[tauri::command]
pub async fn baseline_set(
    state: State<'_, AppState>,
    input: BaselineSetInput,
) -> CommandResult<ProductivityBaselineRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.cost_codes().set_baseline(input)).await
}

#[tauri::command]
pub async fn baseline_get(
    state: State<'_, AppState>,
    cost_code_id: String,
) -> CommandResult<Option<ProductivityBaselineRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.cost_codes().get_baseline(&cost_code_id)).await
}
