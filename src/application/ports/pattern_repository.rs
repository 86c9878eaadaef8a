use async_trait::async_trait;

use crate::application::dto::configs::Pattern;

#[async_trait]
pub trait PatternRepository: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Pattern>>;
    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<Pattern>>;
    async fn create(&self, name: &str, regex: &str) -> anyhow::Result<u32>;
    async fn update(&self, id: u32, name: &str, regex: &str) -> anyhow::Result<()>;
}
