use async_trait::async_trait;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use crate::application::ports::user_repository::{NewUserRecord, UserRepository, UserRow};
use crate::domain::users::user::Role;
use crate::infrastructure::db::{MySqlPool, inserted_id};

const USER_COLUMNS: &str = "id, username, role, anonymous, name, email, age, password";

pub struct SqlxUserRepository {
    pub pool: MySqlPool,
}

impl SqlxUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn user_row(r: &MySqlRow) -> anyhow::Result<UserRow> {
    let role: String = r.get("role");
    Ok(UserRow {
        id: r.get("id"),
        username: r.get("username"),
        role: Role::parse(&role).ok_or_else(|| anyhow::anyhow!("unknown user role {role}"))?,
        anonymous: r.get("anonymous"),
        name: r.get("name"),
        email: r.get("email"),
        age: r.get("age"),
        password_hash: r.get("password"),
    })
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, user: &NewUserRecord) -> anyhow::Result<UserRow> {
        let res = sqlx::query(
            r#"INSERT INTO `user` (username, role, anonymous, name, email, age, password)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&user.username)
        .bind(user.role.as_str())
        .bind(user.anonymous)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await?;
        Ok(UserRow {
            id: inserted_id(&res)?,
            username: user.username.clone(),
            role: user.role,
            anonymous: user.anonymous,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            password_hash: user.password_hash.clone(),
        })
    }

    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM `user` WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM `user` WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_row).transpose()
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM `user` WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<UserRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM `user` WHERE role = ? ORDER BY id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_row).collect()
    }

    async fn update_credentials(
        &self,
        id: u32,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE `user` SET username = ?, password = ? WHERE id = ?")
            .bind(username)
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
