pub mod analytics_service;
pub mod causation_service;
pub mod cost_code_service;
pub mod daily_log_service;
pub mod delay_event_service;
pub mod derivation_service;
pub mod notice_service;
pub mod settings_service;
pub mod summary_service;
pub mod time_entry_service;
