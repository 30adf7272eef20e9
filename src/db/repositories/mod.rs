pub mod cost_code_repository;
pub mod daily_log_repository;
pub mod delay_event_repository;
pub mod notice_repository;
pub mod productivity_repository;
pub mod settings_repository;
pub mod time_entry_repository;
