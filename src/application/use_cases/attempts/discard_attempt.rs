use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;

use super::unfinished_attempt;

/// Drops the caller's unfinished attempt along with its logs and form answers.
pub struct DiscardAttempt<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
}

impl<'a> DiscardAttempt<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<(), ApiError> {
        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        self.attempts.delete(attempt.id).await?;
        tracing::info!(user_id, attempt_id = attempt.id, "attempt_discarded");
        Ok(())
    }
}
