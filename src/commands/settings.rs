use tauri::State;

use crate::models::settings::{EngineSettingsRecord, EngineSettingsUpdateInput};

use super::{run_blocking, AppState, CommandResult};

#[tauri::command]
pub async fn engine_settings_get(
    state: State<'_, AppState>,
) -> CommandResult<EngineSettingsRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.settings().get()).await
}

#[tauri::command]
pub async fn engine_settings_update(
    state: State<'_, AppState>,
    input: EngineSettingsUpdateInput,
) -> CommandResult<EngineSettingsRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.settings().update(input)).await
}
