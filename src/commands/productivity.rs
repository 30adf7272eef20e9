use tauri::State;

use crate::models::productivity::{ProductivityEntryRecord, RecomputeOutcome};
use crate::models::summary::ProductivitySummary;

use super::{run_blocking, AppState, CommandResult};

/// Refreshes the per-cost-code analytics. Must run after a batch of new
/// entries before the summary reflects them.
#[tauri::command]
pub async fn productivity_recompute(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<RecomputeOutcome> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.analytics().recompute_analytics(&project_id)).await
}

#[tauri::command]
pub async fn productivity_summary_get(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<ProductivitySummary> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.summary().get_productivity_summary(&project_id)).await
}

#[tauri::command]
pub async fn productivity_entries_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<ProductivityEntryRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        let db = app_state.db();
        db.with_connection(|conn| {
            crate::db::repositories::productivity_repository::ProductivityRepository::list_entries_by_project(
                conn,
                &project_id,
            )
        })
    })
    .await
}
