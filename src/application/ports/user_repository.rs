use async_trait::async_trait;

use crate::application::dto::users::{Admin, User};
use crate::domain::users::user::Role;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: u32,
    pub username: String,
    pub role: Role,
    pub anonymous: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub password_hash: String,
}

impl UserRow {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            anonymous: self.anonymous,
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age,
        }
    }

    pub fn to_admin(&self) -> Admin {
        Admin {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub role: Role,
    pub anonymous: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUserRecord) -> anyhow::Result<UserRow>;
    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<UserRow>>;
    async fn update_credentials(
        &self,
        id: u32,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<()>;
}
