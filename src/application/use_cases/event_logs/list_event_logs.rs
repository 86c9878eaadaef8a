use crate::application::dto::events::{QuestionEventLog, QuestionEventLogWithUserId};
use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::services::event_logs::build_question_logs;
use crate::application::use_cases::attempts::active_version;

async fn logs_of(
    events: &dyn EventLogRepository,
    attempt: &AttemptRow,
) -> anyhow::Result<Vec<QuestionEventLog>> {
    let questions = events.list_question_logs(attempt.id).await?;
    let options = events.list_option_logs(attempt.id).await?;
    Ok(build_question_logs(&questions, &options))
}

/// Question event summaries of every attempt in the active configuration.
pub struct ListEventLogs<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub events: &'a dyn EventLogRepository,
}

impl<'a> ListEventLogs<'a> {
    pub async fn execute(&self) -> Result<Vec<QuestionEventLogWithUserId>, ApiError> {
        let version = active_version(self.configs).await?;
        let mut out = Vec::new();
        for attempt in self.attempts.list_by_config(version).await? {
            out.extend(
                logs_of(self.events, &attempt)
                    .await?
                    .into_iter()
                    .map(|log| QuestionEventLogWithUserId::new(attempt.user_id, log)),
            );
        }
        Ok(out)
    }

    pub async fn for_user(&self, user_id: u32) -> Result<Vec<QuestionEventLog>, ApiError> {
        let version = active_version(self.configs).await?;
        let mut out = Vec::new();
        for attempt in self.attempts.list_by_config(version).await? {
            if attempt.user_id == user_id {
                out.extend(logs_of(self.events, &attempt).await?);
            }
        }
        Ok(out)
    }
}
