use tauri::State;

use crate::models::delay::{DelayEventCreateInput, DelayEventRecord};

use super::{run_blocking, AppState, CommandResult};

#[tauri::command]
pub async fn delay_events_create(
    state: State<'_, AppState>,
    input: DelayEventCreateInput,
) -> CommandResult<DelayEventRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.delay_events().create_delay_event(input)).await
}

#[tauri::command]
pub async fn delay_events_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<DelayEventRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.delay_events().list_delay_events(&project_id)).await
}
