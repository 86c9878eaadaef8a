use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct TranslationRow {
    pub key_id: u32,
    pub key: String,
    pub description: String,
    pub arguments: Vec<String>,
    pub value: Option<String>,
}

#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Every known key with the value stored for `version`, if any.
    async fn list_for_config(&self, version: u32) -> anyhow::Result<Vec<TranslationRow>>;
    async fn upsert_value(&self, version: u32, key_id: u32, value: &str) -> anyhow::Result<()>;
}
