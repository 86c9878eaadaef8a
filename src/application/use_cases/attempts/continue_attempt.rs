use crate::application::dto::attempts::UserTestAttempt;
use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::form_answer_repository::FormAnswerRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::services::images::Images;
use crate::application::services::{event_logs, test_groups};
use crate::domain::forms::form::FormType;

use super::unfinished_attempt;

/// Rebuilds the state of the caller's unfinished attempt so the client can resume it.
pub struct ContinueAttempt<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub groups: &'a dyn TestGroupRepository,
    pub answers: &'a dyn FormAnswerRepository,
    pub events: &'a dyn EventLogRepository,
    pub images: Images<'a>,
}

impl<'a> ContinueAttempt<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<UserTestAttempt, ApiError> {
        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        let row = self
            .groups
            .find_group(attempt.group_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("group {} of attempt {} is gone", attempt.group_id, attempt.id))?;
        let group = test_groups::load_group(self.groups, &self.images, row).await?;

        let submitted = self.answers.submitted_types(attempt.id).await?;
        let option_logs = self.events.list_option_logs(attempt.id).await?;
        let test_answers = event_logs::current_answers(&option_logs);
        let completed_test = test_answers.len() == test_groups::question_count(&group);

        Ok(UserTestAttempt {
            completed_pre_test_form: submitted.contains(&FormType::Pre),
            completed_test,
            completed_post_test_form: submitted.contains(&FormType::Post),
            test_answers,
            assigned_group: test_groups::assign(&group, &mut rand::thread_rng()),
        })
    }
}
