use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::errors::FieldErrors;
use crate::domain::users::user::{
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string())
}

/// False for a wrong password as well as for an unparsable stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored_password_hash_unparsable");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn check_username(errors: &mut FieldErrors, field: &str, username: &str) {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        errors.push(
            field,
            format!("Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"),
        );
    }
    if username.contains(' ') {
        errors.push(field, "Username cannot contain spaces");
    }
}

pub fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        errors.push(
            field,
            format!("Password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"),
        );
    }
    if password.contains(' ') {
        errors.push(field, "Password cannot contain spaces");
    }
}
