use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::dto::forms::FormAnswer;
use crate::domain::forms::form::FormType;

#[derive(Debug, Clone)]
pub struct FormSubmissionRow {
    pub id: u64,
    pub attempt_id: u64,
    pub form_id: u32,
    pub form_type: FormType,
    pub config_version: u32,
    pub timestamp: DateTime<Utc>,
    pub answers: Vec<FormAnswer>,
}

#[async_trait]
pub trait FormAnswerRepository: Send + Sync {
    async fn has_submission(&self, attempt_id: u64, form_id: u32) -> anyhow::Result<bool>;
    /// Form types already submitted within the attempt.
    async fn submitted_types(&self, attempt_id: u64) -> anyhow::Result<Vec<FormType>>;
    /// Stores the submission and its answers atomically.
    async fn save_submission(
        &self,
        attempt_id: u64,
        form_id: u32,
        timestamp: DateTime<Utc>,
        answers: &[FormAnswer],
    ) -> anyhow::Result<u64>;
    /// Submissions of every attempt of the user, oldest first.
    async fn list_for_user(&self, user_id: u32) -> anyhow::Result<Vec<FormSubmissionRow>>;
}
