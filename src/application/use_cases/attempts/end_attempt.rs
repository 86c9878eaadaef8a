use chrono::Utc;

use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;

use super::unfinished_attempt;

pub struct EndAttempt<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
}

impl<'a> EndAttempt<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<(), ApiError> {
        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        self.attempts.finish(attempt.id, Utc::now()).await?;
        tracing::info!(user_id, attempt_id = attempt.id, "attempt_finished");
        Ok(())
    }
}
