use crate::application::errors::ApiError;
use crate::application::ports::config_repository::ConfigRepository;

pub struct ActivateConfig<'a, R: ConfigRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ConfigRepository + ?Sized> ActivateConfig<'a, R> {
    pub async fn execute(&self, version: u32) -> Result<(), ApiError> {
        if self.repo.find(version).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "Configuration {version} not found"
            )));
        }
        self.repo.activate(version).await?;
        tracing::info!(version, "config_activated");
        Ok(())
    }
}
