use serde::Serialize;
use tauri::State;
use tracing::warn;

use crate::models::productivity::DerivationOutcome;
use crate::models::time_entry::{TimeEntryCreateInput, TimeEntryRecord};

use super::{run_blocking, AppState, CommandResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryApprovalResponse {
    pub approved_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<DerivationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation_warning: Option<String>,
}

#[tauri::command]
pub async fn time_entries_create(
    state: State<'_, AppState>,
    input: TimeEntryCreateInput,
) -> CommandResult<TimeEntryRecord> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.time_entries().create_time_entry(input)).await
}

#[tauri::command]
pub async fn time_entries_list(
    state: State<'_, AppState>,
    project_id: String,
) -> CommandResult<Vec<TimeEntryRecord>> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.time_entries().list_time_entries(&project_id)).await
}

/// Approves the day's pending entries, then derives productivity entries
/// best-effort with the same non-fatal warning contract as the log save.
#[tauri::command]
pub async fn time_entries_approve(
    state: State<'_, AppState>,
    project_id: String,
    entry_date: String,
) -> CommandResult<TimeEntryApprovalResponse> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        let approved_count = app_state
            .time_entries()
            .approve_for_date(&project_id, &entry_date)?;

        let (derivation, derivation_warning) = match app_state
            .derivation()
            .derive_from_time_entries(&project_id, &entry_date)
        {
            Ok(outcome) => (Some(outcome), None),
            Err(err) => {
                warn!(
                    target: "app::derivation",
                    entry_date = %entry_date,
                    error = %err,
                    "derivation failed after time entry approval"
                );
                (None, Some(err.to_string()))
            }
        };

        Ok(TimeEntryApprovalResponse {
            approved_count,
            derivation,
            derivation_warning,
        })
    })
    .await
}
