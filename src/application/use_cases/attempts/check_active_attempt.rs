use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;

use super::unfinished_attempt;

pub struct CheckActiveAttempt<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
}

impl<'a> CheckActiveAttempt<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<(), ApiError> {
        unfinished_attempt(self.configs, self.attempts, user_id).await?;
        Ok(())
    }
}
