pub mod causation;
pub mod cost_code;
pub mod daily_log;
pub mod delay_event;
pub mod notice;
pub mod productivity;
pub mod settings;
pub mod time_entry;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tauri::async_runtime;
use tracing::error;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::analytics_service::AnalyticsService;
use crate::services::causation_service::CausationService;
use crate::services::cost_code_service::CostCodeService;
use crate::services::daily_log_service::DailyLogService;
use crate::services::delay_event_service::DelayEventService;
use crate::services::derivation_service::DerivationService;
use crate::services::notice_service::NoticeService;
use crate::services::settings_service::SettingsService;
use crate::services::summary_service::SummaryService;
use crate::services::time_entry_service::TimeEntryService;

#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    cost_code_service: Arc<CostCodeService>,
    daily_log_service: Arc<DailyLogService>,
    delay_event_service: Arc<DelayEventService>,
    time_entry_service: Arc<TimeEntryService>,
    notice_service: Arc<NoticeService>,
    settings_service: Arc<SettingsService>,
    derivation_service: Arc<DerivationService>,
    analytics_service: Arc<AnalyticsService>,
    summary_service: Arc<SummaryService>,
    causation_service: Arc<CausationService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let cost_code_service = Arc::new(CostCodeService::new(db_pool.clone()));
        let daily_log_service = Arc::new(DailyLogService::new(db_pool.clone()));
        let delay_event_service = Arc::new(DelayEventService::new(db_pool.clone()));
        let time_entry_service = Arc::new(TimeEntryService::new(db_pool.clone()));
        let notice_service = Arc::new(NoticeService::new(db_pool.clone()));
        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let derivation_service = Arc::new(DerivationService::new(db_pool.clone()));
        let analytics_service = Arc::new(AnalyticsService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));
        let summary_service = Arc::new(SummaryService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));
        let causation_service = Arc::new(CausationService::new(
            db_pool.clone(),
            Arc::clone(&settings_service),
        ));

        Ok(Self {
            db_pool,
            cost_code_service,
            daily_log_service,
            delay_event_service,
            time_entry_service,
            notice_service,
            settings_service,
            derivation_service,
            analytics_service,
            summary_service,
            causation_service,
        })
    }

    pub fn cost_codes(&self) -> Arc<CostCodeService> {
        Arc::clone(&self.cost_code_service)
    }

    pub fn daily_logs(&self) -> Arc<DailyLogService> {
        Arc::clone(&self.daily_log_service)
    }

    pub fn delay_events(&self) -> Arc<DelayEventService> {
        Arc::clone(&self.delay_event_service)
    }

    pub fn time_entries(&self) -> Arc<TimeEntryService> {
        Arc::clone(&self.time_entry_service)
    }

    pub fn notices(&self) -> Arc<NoticeService> {
        Arc::clone(&self.notice_service)
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn derivation(&self) -> Arc<DerivationService> {
        Arc::clone(&self.derivation_service)
    }

    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics_service)
    }

    pub fn summary(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summary_service)
    }

    pub fn causation(&self) -> Arc<CausationService> {
        Arc::clone(&self.causation_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::NotFound => {
                CommandError::new("NOT_FOUND", "the requested record does not exist", None)
            }
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "filesystem read or write failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

pub(crate) async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> CommandResult<T> {
    async_runtime::spawn_blocking(task)
        .await
        .map_err(|err| CommandError::new("UNKNOWN", format!("background task failed: {err}"), None))?
        .map_err(CommandError::from)
}
