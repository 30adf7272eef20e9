use serde::Serialize;
use tauri::State;
use tracing::warn;

use crate::models::daily_log::{DailyLogRecord, DailyLogSaveInput, LOG_STATUS_SUBMITTED};
use crate::models::productivity::DerivationOutcome;

use super::{run_blocking, AppState, CommandResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogSaveResponse {
    pub log: DailyLogRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<DerivationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation_warning: Option<String>,
}

/// Saves the log, then derives productivity entries best-effort. A
/// derivation failure is reported as a warning next to the saved log and
/// never fails the save itself.
#[tauri::command]
pub async fn daily_logs_save(
    state: State<'_, AppState>,
    input: DailyLogSaveInput,
) -> CommandResult<DailyLogSaveResponse> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        let log = app_state.daily_logs().save_daily_log(input)?;

        let (derivation, derivation_warning) = if log.status == LOG_STATUS_SUBMITTED {
            match app_state
                .derivation()
                .derive_from_daily_log(&log.project_id, &log.id)
            {
                Ok(outcome) => (Some(outcome), None),
                Err(err) => {
                    warn!(
                        target: "app::derivation",
                        daily_log_id = %log.id,
                        error = %err,
                        "derivation failed after daily log save"
                    );
                    (None, Some(err.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Ok(DailyLogSaveResponse {
            log,
            derivation,
            derivation_warning,
        })
    })
    .await
}

#[tauri::command]
pub async fn daily_logs_get(
    state: State<'_, AppState>,
    id: String,
) -> CommandResult<DailyLogRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.daily_logs().get_daily_log(&id)).await
}

#[tauri::command]
pub async fn daily_logs_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<DailyLogRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.daily_logs().list_daily_logs(&project_id)).await
}
