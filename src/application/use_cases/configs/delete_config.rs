use crate::application::errors::ApiError;
use crate::application::use_cases::ConfigPorts;

pub struct DeleteConfig<'a> {
    pub ports: ConfigPorts<'a>,
}

impl<'a> DeleteConfig<'a> {
    pub async fn execute(&self, version: u32) -> Result<(), ApiError> {
        let configs = self.ports.configs;
        let row = configs
            .find(version)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Configuration {version} not found")))?;
        if configs.versions_with_user_data().await?.contains(&version) {
            return Err(ApiError::conflict(
                "Configuration has user data associated with it and cannot be deleted",
            ));
        }
        if row.active {
            return Err(ApiError::conflict("Active configuration cannot be deleted"));
        }
        let images = configs.referenced_image_ids(version).await?;
        configs.delete(version).await?;
        self.ports.images.release_all(&images).await;
        tracing::info!(version, released_images = images.len(), "config_deleted");
        Ok(())
    }
}
