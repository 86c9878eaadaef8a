use crate::application::dto::users::CredentialsUpdate;
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::services::accounts;

pub struct UpdateCredentials<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UpdateCredentials<'a, R> {
    pub async fn execute(&self, user: &UserRow, req: &CredentialsUpdate) -> Result<(), ApiError> {
        let new_username = req.new_username.trim();
        let new_password = req.new_password.trim();

        let mut errors = FieldErrors::new();
        if req.old_username.trim() != user.username {
            errors.push("oldUsername", "Username does not match the current one");
        }
        if !accounts::verify_password(req.old_password.trim(), &user.password_hash) {
            errors.push("oldPassword", "Password does not match the current one");
        }
        if new_password != req.confirm_new_password.trim() {
            errors.push("confirmNewPassword", "Passwords do not match");
        }
        accounts::check_username(&mut errors, "newUsername", new_username);
        accounts::check_password(&mut errors, "newPassword", new_password);
        if new_username != user.username {
            if let Some(other) = self.repo.find_by_username(new_username).await? {
                if other.id != user.id {
                    errors.push("newUsername", "User with that username already exists");
                }
            }
        }
        errors.into_result("Invalid credentials update")?;

        let hash = accounts::hash_password(new_password)?;
        self.repo
            .update_credentials(user.id, new_username, &hash)
            .await?;
        tracing::info!(user_id = user.id, "credentials_updated");
        Ok(())
    }
}
