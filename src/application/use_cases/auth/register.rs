use crate::application::dto::users::{Credentials, NewUser};
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::Login;
use crate::application::use_cases::users::create_user::CreateUser;

/// Creates a participant account and signs it in.
pub struct Register<'a> {
    pub create: CreateUser<'a>,
}

impl<'a> Register<'a> {
    pub async fn execute(&self, req: &NewUser) -> Result<UserRow, ApiError> {
        self.create.execute(req).await?;
        Login {
            repo: self.create.users,
        }
        .execute(&Credentials {
            username: req.username.clone(),
            password: req.password.clone(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryStore;

    #[tokio::test]
    async fn registered_user_is_signed_in() {
        let store = MemoryStore::with_active_config(true);
        let uc = Register {
            create: CreateUser {
                users: &store,
                configs: &store,
                patterns: &store,
            },
        };
        let row = uc
            .execute(&NewUser {
                username: " ana ".into(),
                name: None,
                email: None,
                age: None,
                password: "password1".into(),
            })
            .await
            .unwrap();
        assert_eq!(row.username, "ana");
    }
}
