use crate::application::dto::events::NewQuestionEventLog;
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::use_cases::attempts::unfinished_attempt;

use super::{INVALID_FIELDS, check_id, check_timestamp};

/// Records one visit of a test question by the caller.
pub struct SaveQuestionEvent<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub groups: &'a dyn TestGroupRepository,
    pub events: &'a dyn EventLogRepository,
}

impl<'a> SaveQuestionEvent<'a> {
    pub async fn execute(&self, user_id: u32, req: &NewQuestionEventLog) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        let question_id =
            check_id(&mut errors, "questionId", "Question id", req.question_id.as_ref());
        let timestamp = check_timestamp(&mut errors, req.timestamp.as_ref());
        let duration = match &req.duration {
            None => {
                errors.push("duration", "Duration is required");
                None
            }
            Some(d) => {
                let duration = d.valid().and_then(|d| u32::try_from(*d).ok());
                if duration.is_none() {
                    errors.push("duration", "Duration must be a positive integer");
                }
                duration
            }
        };
        errors.into_result(INVALID_FIELDS)?;
        let (Some(question_id), Some(timestamp), Some(duration)) = (question_id, timestamp, duration)
        else {
            return Err(ApiError::invalid(INVALID_FIELDS, Vec::new()));
        };

        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        if self.groups.question_group_id(question_id).await? != Some(attempt.group_id) {
            return Err(ApiError::not_found(format!(
                "Test question with id {question_id} not found in group {}",
                attempt.group_id
            )));
        }
        self.events
            .save_question_log(attempt.id, question_id, timestamp, duration)
            .await?;
        Ok(())
    }
}
