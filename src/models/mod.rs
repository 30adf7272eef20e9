pub mod causation;
pub mod cost_code;
pub mod daily_log;
pub mod delay;
pub mod notice;
pub mod productivity;
pub mod settings;
pub mod summary;
pub mod time_entry;
