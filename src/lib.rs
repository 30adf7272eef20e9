pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(error) = try_run() {
        eprintln!("failed to launch application: {error}");
    }
}

fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let handle = app.handle();

            crate::utils::logger::init_logging(&handle)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            let mut data_dir = handle
                .path()
                .app_data_dir()
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            std::fs::create_dir_all(&data_dir)?;
            data_dir.push("fieldledger.sqlite");

            let pool = crate::db::DbPool::new(&data_dir)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            let state = crate::commands::AppState::new(pool)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            crate::commands::cost_code::cost_codes_create,
            crate::commands::cost_code::cost_codes_list,
            crate::commands::cost_code::baseline_set,
            crate::commands::cost_code::baseline_get,
            crate::commands::daily_log::daily_logs_save,
            crate::commands::daily_log::daily_logs_get,
            crate::commands::daily_log::daily_logs_list,
            crate::commands::delay_event::delay_events_create,
            crate::commands::delay_event::delay_events_list,
            crate::commands::time_entry::time_entries_create,
            crate::commands::time_entry::time_entries_list,
            crate::commands::time_entry::time_entries_approve,
            crate::commands::notice::notices_create,
            crate::commands::notice::notices_list,
            crate::commands::productivity::productivity_recompute,
            crate::commands::productivity::productivity_summary_get,
            crate::commands::productivity::productivity_entries_list,
            crate::commands::causation::causation_chains_list,
            crate::commands::settings::engine_settings_get,
            crate::commands::settings::engine_settings_update,
        ])
        .run(tauri::generate_context!())?;

    Ok(())
}
