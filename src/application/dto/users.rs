use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub username: String,
    pub anonymous: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Admin {
    pub id: u32,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsUpdate {
    pub old_username: String,
    pub new_username: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Token {
    pub token: String,
}
