use crate::application::dto::results::ResultsByUser;
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::results::{ResultPorts, results_for_user};
use crate::domain::users::user::Role;

/// Form submissions and test results of one participant across every configuration.
pub struct GetUserResults<'a> {
    pub users: &'a dyn UserRepository,
    pub ports: ResultPorts<'a>,
}

impl<'a> GetUserResults<'a> {
    pub async fn execute(&self, user_id: u32) -> Result<ResultsByUser, ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.role == Role::User)
            .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;
        Ok(results_for_user(&self.ports, &user).await?)
    }
}
