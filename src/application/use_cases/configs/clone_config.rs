use crate::application::dto::configs::ClonedConfig;
use crate::application::errors::ApiError;
use crate::application::ports::config_repository::ConfigRepository;

pub struct CloneConfig<'a, R: ConfigRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ConfigRepository + ?Sized> CloneConfig<'a, R> {
    pub async fn execute(&self, version: u32) -> Result<ClonedConfig, ApiError> {
        if self.repo.find(version).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "Configuration {version} not found"
            )));
        }
        let cloned = self.repo.clone_config(version).await?;
        tracing::info!(source = version, version = cloned, "config_cloned");
        Ok(ClonedConfig { version: cloned })
    }
}
