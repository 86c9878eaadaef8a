pub mod login;
pub mod register;
pub mod update_credentials;
