use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRow {
    pub id: u32,
    pub path: String,
    pub alt: String,
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find(&self, id: u32) -> anyhow::Result<Option<ImageRow>>;
    async fn find_many(&self, ids: &[u32]) -> anyhow::Result<Vec<ImageRow>>;
    async fn create(&self, path: &str, alt: &str) -> anyhow::Result<ImageRow>;
    async fn update_path(&self, id: u32, path: &str) -> anyhow::Result<()>;
    async fn delete(&self, id: u32) -> anyhow::Result<()>;
    /// True while any config, card, question or option still points at the image.
    async fn is_referenced(&self, id: u32) -> anyhow::Result<bool>;
}
