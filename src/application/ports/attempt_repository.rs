use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AttemptRow {
    pub id: u64,
    pub user_id: u32,
    pub group_id: u32,
    pub group_label: String,
    pub config_version: u32,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn find_unfinished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>>;
    async fn create(
        &self,
        user_id: u32,
        group_id: u32,
        start: DateTime<Utc>,
    ) -> anyhow::Result<u64>;
    async fn finish(&self, id: u64, end: DateTime<Utc>) -> anyhow::Result<()>;
    /// Removes the attempt together with its event logs and form submissions.
    async fn delete(&self, id: u64) -> anyhow::Result<()>;
    /// Finished attempts of every configuration, newest first.
    async fn list_finished(&self) -> anyhow::Result<Vec<AttemptRow>>;
    async fn latest_finished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>>;
    async fn list_by_config(&self, config_version: u32) -> anyhow::Result<Vec<AttemptRow>>;
    /// Attempts of the user in every configuration, oldest first.
    async fn list_by_user(&self, user_id: u32) -> anyhow::Result<Vec<AttemptRow>>;
}
