use tauri::State;

use crate::models::causation::{CausationChain, CausationChainFilter};

use super::{run_blocking, AppState, CommandResult};

#[tauri::command]
pub async fn causation_chains_list(
    state: State<'_, AppState>,
    project_id: String,
    filter: Option<CausationChainFilter>,
) -> CommandResult<Vec<CausationChain>> {
    let app_state = state.inner().clone();
    let filter = filter.unwrap_or_default();
    run_blocking(move || app_state.causation().list_causation_chains(&project_id, filter)).await
}
