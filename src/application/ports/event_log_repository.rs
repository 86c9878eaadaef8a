use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::events::option_event::OptionEventType;

#[derive(Debug, Clone)]
pub struct QuestionLogRow {
    pub question_id: u32,
    pub timestamp: DateTime<Utc>,
    pub duration: u32,
}

#[derive(Debug, Clone)]
pub struct OptionLogRow {
    pub option_id: u32,
    pub question_id: u32,
    pub correct: bool,
    pub kind: OptionEventType,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait EventLogRepository: Send + Sync {
    async fn save_question_log(
        &self,
        attempt_id: u64,
        question_id: u32,
        timestamp: DateTime<Utc>,
        duration: u32,
    ) -> anyhow::Result<()>;
    async fn save_option_log(
        &self,
        attempt_id: u64,
        option_id: u32,
        kind: OptionEventType,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// Question visits of the attempt ordered by timestamp.
    async fn list_question_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<QuestionLogRow>>;
    /// Option events of the attempt ordered by timestamp.
    async fn list_option_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<OptionLogRow>>;
}
