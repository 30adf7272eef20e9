use tauri::State;

use crate::models::notice::{NoticeCreateInput, NoticeLogRecord};

use super::{run_blocking, AppState, CommandResult};

#[tauri::command]
pub async fn notices_create(
    state: State<'_, AppState>,
    input: NoticeCreateInput,
) -> CommandResult<NoticeLogRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.notices().create_notice(input)).await
}

#[tauri::command]
pub async fn notices_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<NoticeLogRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.notices().list_notices(&project_id)).await
}
