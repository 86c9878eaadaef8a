use std::collections::HashMap;

use crate::application::dto::attempts::{TestAttemptSummary, TestAttemptsSummary};
use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::services::results::test_result;
use crate::application::use_cases::attempts::active_version;

/// Score overviews of finished attempts.
pub struct GetSummaries<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub users: &'a dyn UserRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub events: &'a dyn EventLogRepository,
}

impl<'a> GetSummaries<'a> {
    async fn summary(&self, user: &UserRow, attempt: &AttemptRow) -> anyhow::Result<TestAttemptSummary> {
        let result = test_result(self.events, attempt).await?;
        Ok(TestAttemptSummary {
            user: user.to_user(),
            config_version: attempt.config_version,
            group: result.group,
            timestamp: result.timestamp,
            time_taken: result.time_taken,
            correct_questions: result.correct_questions,
            questions_answered: result.questions_answered,
            accuracy: result.accuracy,
        })
    }

    /// Every finished attempt, newest first, plus averages weighted by answered questions.
    pub async fn all(&self) -> Result<TestAttemptsSummary, ApiError> {
        let mut users: HashMap<u32, UserRow> = HashMap::new();
        let mut summaries = Vec::new();
        for attempt in self.attempts.list_finished().await? {
            if !users.contains_key(&attempt.user_id) {
                match self.users.find_by_id(attempt.user_id).await? {
                    Some(user) => {
                        users.insert(user.id, user);
                    }
                    None => {
                        tracing::warn!(attempt_id = attempt.id, user_id = attempt.user_id, "attempt_without_user");
                        continue;
                    }
                }
            }
            if let Some(user) = users.get(&attempt.user_id) {
                summaries.push(self.summary(user, &attempt).await?);
            }
        }
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let answered: u32 = summaries.iter().map(|s| s.questions_answered).sum();
        let correct: u32 = summaries.iter().map(|s| s.correct_questions).sum();
        let time: i64 = summaries.iter().map(|s| s.time_taken).sum();
        let (average_accuracy, average_time_taken) = if answered > 0 {
            (
                f64::from(correct) / f64::from(answered) * 100.0,
                time as f64 / f64::from(answered),
            )
        } else {
            (0.0, 0.0)
        };

        Ok(TestAttemptsSummary {
            average_accuracy,
            average_time_taken,
            total_questions_answered: answered,
            users: summaries,
        })
    }

    /// Latest finished attempt of `user` in the active configuration.
    pub async fn latest_for(&self, user: &UserRow) -> Result<TestAttemptSummary, ApiError> {
        let version = active_version(self.configs).await?;
        let attempt = self
            .attempts
            .latest_finished(user.id, version)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!(
                    "User with id {} does not have any completed test attempts",
                    user.id
                ))
            })?;
        Ok(self.summary(user, &attempt).await?)
    }
}
