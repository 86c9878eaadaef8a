use crate::application::dto::users::User;
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::Role;

pub struct GetUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetUser<'a, R> {
    pub async fn execute(&self, username: &str) -> Result<User, ApiError> {
        match self.repo.find_by_username(username).await? {
            Some(row) if row.role == Role::User => Ok(row.to_user()),
            _ => Err(ApiError::not_found(format!("User {username} not found"))),
        }
    }
}
