use crate::error::{AppError, AppResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a secret into an Argon2id PHC string.
pub fn hash_secret(secret: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Config(format!("password hashing failed: {}", e)))
}

/// `false` for a wrong secret and for a malformed stored hash.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Validate a new password pair the way registration and password change do.
pub fn validate_new_password(password1: &str, password2: &str, username: &str) -> AppResult<()> {
    if password1 != password2 {
        return Err(AppError::Validation(
            "The two password fields didn't match.".to_string(),
        ));
    }
    if password1.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "This password is entirely numeric.".to_string(),
        ));
    }
    if !username.is_empty() && password1.to_lowercase().contains(&username.to_lowercase()) {
        return Err(AppError::Validation(
            "The password is too similar to the username.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_secret("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("correct horse battery", &hash));
        assert!(!verify_secret("wrong horse", &hash));
        assert!(!verify_secret("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_new_password("s3cretpass", "s3cretpass", "amal").is_ok());
        assert!(validate_new_password("s3cretpass", "other-pass", "amal").is_err());
        assert!(validate_new_password("short", "short", "amal").is_err());
        assert!(validate_new_password("1234567890", "1234567890", "amal").is_err());
        assert!(validate_new_password("amal-rocks-99", "amal-rocks-99", "amal").is_err());
    }
}
