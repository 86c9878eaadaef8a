use crate::application::dto::users::Admin;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::Role;

pub struct ListAdmins<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ListAdmins<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Admin>> {
        let rows = self.repo.list_by_role(Role::Admin).await?;
        Ok(rows.iter().map(|r| r.to_admin()).collect())
    }
}
