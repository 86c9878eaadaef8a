use crate::application::dto::events::NewOptionEventLog;
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::use_cases::attempts::unfinished_attempt;

use super::{INVALID_FIELDS, check_id, check_timestamp};

/// Records a select, deselect or hover on a test option. Shared by the HTTP and WebSocket entry points.
pub struct SaveOptionEvent<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub groups: &'a dyn TestGroupRepository,
    pub events: &'a dyn EventLogRepository,
}

impl<'a> SaveOptionEvent<'a> {
    pub async fn execute(&self, user_id: u32, req: &NewOptionEventLog) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        let option_id = check_id(&mut errors, "optionId", "Option id", req.option_id.as_ref());
        let kind = match &req.kind {
            None => {
                errors.push("type", "Type is required");
                None
            }
            Some(kind) => {
                let kind = kind.valid().copied();
                if kind.is_none() {
                    errors.push("type", "Type must be one of select, deselect, hover");
                }
                kind
            }
        };
        let timestamp = check_timestamp(&mut errors, req.timestamp.as_ref());
        errors.into_result(INVALID_FIELDS)?;
        let (Some(option_id), Some(kind), Some(timestamp)) = (option_id, kind, timestamp) else {
            return Err(ApiError::invalid(INVALID_FIELDS, Vec::new()));
        };

        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        if self.groups.option_group_id(option_id).await? != Some(attempt.group_id) {
            return Err(ApiError::not_found(format!(
                "Test option with id {option_id} not found in group {}",
                attempt.group_id
            )));
        }
        self.events
            .save_option_log(attempt.id, option_id, kind, timestamp)
            .await?;
        tracing::debug!(user_id, attempt_id = attempt.id, option_id, kind = kind.as_str(), "option_event_saved");
        Ok(())
    }
}
