use async_trait::async_trait;

/// Byte storage for image files addressed by their relative path (`images/...`).
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> anyhow::Result<()>;
    async fn exists(&self, relative_path: &str) -> anyhow::Result<bool>;
    async fn read(&self, relative_path: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn remove(&self, relative_path: &str) -> anyhow::Result<()>;
}
