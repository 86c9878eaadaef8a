use regex::Regex;

use crate::application::dto::users::NewUser;
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::user_repository::{NewUserRecord, UserRepository, UserRow};
use crate::application::services::accounts;
use crate::domain::users::user::{self, EMAIL_MAX_LEN, NAME_MAX_LEN, Role};

/// Registers a participant under the rules of the active configuration.
pub struct CreateUser<'a> {
    pub users: &'a dyn UserRepository,
    pub configs: &'a dyn ConfigRepository,
    pub patterns: &'a dyn PatternRepository,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string())
}

impl<'a> CreateUser<'a> {
    pub async fn execute(&self, req: &NewUser) -> Result<UserRow, ApiError> {
        let config = self
            .configs
            .find_active()
            .await?
            .ok_or_else(ApiError::no_active_config)?;
        let pattern = match config.username_pattern_id {
            Some(id) => self.patterns.find_by_id(id).await?,
            None => None,
        };

        let username = req.username.trim().to_string();
        let password = req.password.trim().to_string();
        let name = trimmed(&req.name);
        let email = trimmed(&req.email);

        let mut errors = FieldErrors::new();
        accounts::check_username(&mut errors, "username", &username);
        accounts::check_password(&mut errors, "password", &password);

        if config.anonymous {
            if name.is_some() {
                errors.push("name", "Name must be empty for anonymous users");
            }
            if email.is_some() {
                errors.push("email", "Email must be empty for anonymous users");
            }
            if req.age.is_some() {
                errors.push("age", "Age must be empty for anonymous users");
            }
        } else {
            if let Some(pattern) = &pattern {
                match Regex::new(&format!("^(?:{})$", pattern.regex)) {
                    Ok(re) if !re.is_match(&username) => errors.push(
                        "username",
                        format!("Username is not a valid {}", pattern.name),
                    ),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!(error = %err, pattern_id = pattern.id, "username_pattern_invalid")
                    }
                }
            }
            match name.as_deref() {
                None | Some("") => {
                    errors.push("name", "Name is required for non-anonymous users")
                }
                Some(n) if n.chars().count() > NAME_MAX_LEN => errors.push(
                    "name",
                    format!("Name cannot be longer than {NAME_MAX_LEN} characters"),
                ),
                Some(_) => {}
            }
            match email.as_deref() {
                None | Some("") => {
                    errors.push("email", "Email is required for non-anonymous users")
                }
                Some(e) if e.chars().count() > EMAIL_MAX_LEN => errors.push(
                    "email",
                    format!("Email cannot be longer than {EMAIL_MAX_LEN} characters"),
                ),
                Some(e) if !user::looks_like_email(e) => {
                    errors.push("email", "Email is not valid")
                }
                Some(_) => {}
            }
            match req.age {
                None => errors.push("age", "Age is required for non-anonymous users"),
                Some(age) if !(0..=255).contains(&age) => {
                    errors.push("age", "Age must be between 0 and 255")
                }
                Some(_) => {}
            }
        }

        if !username.is_empty() && self.users.find_by_username(&username).await?.is_some() {
            errors.push("username", "User with that username already exists");
        }
        if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
            if self.users.email_exists(email).await? {
                errors.push("email", "User with that email already exists");
            }
        }
        errors.into_result("Invalid user")?;

        let record = NewUserRecord {
            username,
            role: Role::User,
            anonymous: config.anonymous,
            name,
            email,
            age: req.age.and_then(|a| u8::try_from(a).ok()),
            password_hash: accounts::hash_password(&password)?,
        };
        let row = self.users.create_user(&record).await?;
        tracing::info!(user_id = row.id, "user_registered");
        Ok(row)
    }
}
