use chrono::Utc;

use crate::application::dto::attempts::UserTestAttempt;
use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::services::images::Images;
use crate::application::services::test_groups;
use crate::domain::test_groups::sampling;

use super::active_version;

/// Starts a new attempt in a randomly sampled group of the active configuration.
pub struct BeginAttempt<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub groups: &'a dyn TestGroupRepository,
    pub images: Images<'a>,
}

impl<'a> BeginAttempt<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<UserTestAttempt, ApiError> {
        let version = active_version(self.configs).await?;
        if self.attempts.find_unfinished(user_id, version).await?.is_some() {
            return Err(ApiError::conflict("User has already started an attempt"));
        }

        let rows = self.groups.list_groups(version).await?;
        let row = {
            let mut rng = rand::thread_rng();
            sampling::sample(&rows, |g| g.probability, &mut rng)
                .map_err(|err| anyhow::anyhow!("cannot sample a test group: {err}"))?
                .clone()
        };
        let group = test_groups::load_group(self.groups, &self.images, row).await?;
        let attempt_id = self.attempts.create(user_id, group.id, Utc::now()).await?;
        tracing::info!(user_id, attempt_id, group_id = group.id, "attempt_started");

        let assigned_group = test_groups::assign(&group, &mut rand::thread_rng());
        Ok(UserTestAttempt {
            completed_pre_test_form: false,
            completed_test: false,
            completed_post_test_form: false,
            test_answers: Vec::new(),
            assigned_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::users::user::Role;

    #[tokio::test]
    async fn starts_once_per_active_config() {
        let fx = Fixture::default();
        fx.store.add_group(1, "control", 100, &[&[&[true, false]]]);
        fx.store.add_group(1, "never", 0, &[&[&[true]]]);
        let user = fx.store.add_user("ana", Role::User, "x");
        let uc = BeginAttempt {
            configs: &fx.store,
            attempts: &fx.store,
            groups: &fx.store,
            images: fx.images(),
        };

        let attempt = uc.execute(user.id).await.unwrap();
        assert_eq!(attempt.assigned_group.label, "control");
        assert!(attempt.test_answers.is_empty());
        assert_eq!(fx.store.lock().attempts.len(), 1);

        let err = uc.execute(user.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(m) if m == "User has already started an attempt"));
    }

    #[tokio::test]
    async fn fails_when_probabilities_are_broken() {
        let fx = Fixture::default();
        fx.store.add_group(1, "half", 50, &[&[&[true]]]);
        let user = fx.store.add_user("ana", Role::User, "x");
        let err = BeginAttempt {
            configs: &fx.store,
            attempts: &fx.store,
            groups: &fx.store,
            images: fx.images(),
        }
        .execute(user.id)
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert!(fx.store.lock().attempts.is_empty());
    }
}
