use std::collections::HashSet;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ConfigRow {
    pub version: u32,
    pub icon_id: Option<u32>,
    pub username_pattern_id: Option<u32>,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub informed_consent: String,
    pub anonymous: bool,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigFields {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub informed_consent: String,
    pub anonymous: bool,
    pub icon_id: Option<u32>,
    pub username_pattern_id: Option<u32>,
}

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<ConfigRow>>;
    async fn find(&self, version: u32) -> anyhow::Result<Option<ConfigRow>>;
    async fn find_active(&self) -> anyhow::Result<Option<ConfigRow>>;
    /// Versions that have at least one test attempt.
    async fn versions_with_user_data(&self) -> anyhow::Result<HashSet<u32>>;
    async fn update_fields(&self, version: u32, fields: &ConfigFields) -> anyhow::Result<()>;
    /// Marks `version` as the only active configuration.
    async fn activate(&self, version: u32) -> anyhow::Result<()>;
    /// Deletes the configuration and everything it owns.
    async fn delete(&self, version: u32) -> anyhow::Result<()>;
    /// Images referenced anywhere inside the configuration.
    async fn referenced_image_ids(&self, version: u32) -> anyhow::Result<Vec<u32>>;
    /// Deep copy of the configuration into a new, inactive version.
    async fn clone_config(&self, version: u32) -> anyhow::Result<u32>;
}
