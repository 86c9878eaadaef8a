use crate::application::dto::users::User;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::Role;

pub struct ListUsers<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ListUsers<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<User>> {
        let rows = self.repo.list_by_role(Role::User).await?;
        Ok(rows.iter().map(|r| r.to_user()).collect())
    }
}
