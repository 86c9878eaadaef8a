use crate::application::dto::users::Credentials;
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::services::accounts;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, req: &Credentials) -> Result<UserRow, ApiError> {
        let invalid = || ApiError::Unauthorized("Invalid credentials".into());
        let row = self
            .repo
            .find_by_username(req.username.trim())
            .await?
            .ok_or_else(invalid)?;
        if accounts::verify_password(req.password.trim(), &row.password_hash) {
            Ok(row)
        } else {
            Err(invalid())
        }
    }
}
