pub mod begin_attempt;
pub mod check_active_attempt;
pub mod continue_attempt;
pub mod discard_attempt;
pub mod end_attempt;

use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::application::ports::config_repository::ConfigRepository;

/// Version of the active configuration.
pub(crate) async fn active_version(configs: &dyn ConfigRepository) -> Result<u32, ApiError> {
    configs
        .find_active()
        .await?
        .map(|c| c.version)
        .ok_or_else(ApiError::no_active_config)
}

/// The caller's unfinished attempt in the active configuration.
pub(crate) async fn unfinished_attempt(
    configs: &dyn ConfigRepository,
    attempts: &dyn AttemptRepository,
    user_id: u32,
) -> Result<AttemptRow, ApiError> {
    let version = active_version(configs).await?;
    attempts
        .find_unfinished(user_id, version)
        .await?
        .ok_or_else(ApiError::no_attempt)
}
