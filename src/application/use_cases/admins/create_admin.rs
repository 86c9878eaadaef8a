use crate::application::dto::users::{Admin, NewAdmin};
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::user_repository::{NewUserRecord, UserRepository};
use crate::application::services::accounts;
use crate::domain::users::user::Role;

pub struct CreateAdmin<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> CreateAdmin<'a, R> {
    pub async fn execute(&self, req: &NewAdmin) -> Result<Admin, ApiError> {
        let username = req.username.trim().to_string();
        let password = req.password.trim().to_string();

        let mut errors = FieldErrors::new();
        accounts::check_username(&mut errors, "username", &username);
        accounts::check_password(&mut errors, "password", &password);
        if !username.is_empty() && self.repo.find_by_username(&username).await?.is_some() {
            errors.push("username", "User with that username already exists");
        }
        errors.into_result("Invalid admin")?;

        let row = self
            .repo
            .create_user(&NewUserRecord {
                username,
                role: Role::Admin,
                anonymous: true,
                name: None,
                email: None,
                age: None,
                password_hash: accounts::hash_password(&password)?,
            })
            .await?;
        tracing::info!(user_id = row.id, "admin_created");
        Ok(row.to_admin())
    }
}
