//! User domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::constants::{MIN_DISPLAY_NAME_LENGTH, MIN_PASSWORD_LENGTH, UNASSIGNED_ID};
use crate::error::{DomainError, DomainResult};
use crate::password::Password;

/// User domain entity.
///
/// The plaintext `password` only exists between construction and
/// [`User::before_create`]; it is never serialized. The hash in
/// `encrypted_password` is serialized so the store can persist it, and is
/// stripped by [`User::sanitize`] before a user leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    /// Identifier assigned by the repository
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub id: u64,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Display name
    #[cfg_attr(feature = "openapi", schema(example = "Ann"))]
    pub display_name: String,
    /// Email address
    #[cfg_attr(feature = "openapi", schema(example = "ann@example.org"))]
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[cfg_attr(feature = "openapi", schema(read_only))]
    pub encrypted_password: String,
}

impl User {
    /// Build an unpersisted user from creation input.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            created_at: Utc::now(),
            display_name: display_name.into(),
            email: email.into(),
            password: password.into(),
            encrypted_password: String::new(),
        }
    }

    /// Check that the user is fit to be persisted.
    ///
    /// A plaintext password is required unless the user already carries a hash.
    pub fn validate(&self) -> DomainResult<()> {
        validate_display_name(&self.display_name)?;

        if !self.email.validate_email() {
            return Err(DomainError::validation("Invalid email format"));
        }

        if self.encrypted_password.is_empty() {
            if self.password.is_empty() {
                return Err(DomainError::validation("Password is required"));
            }
            if self.password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(DomainError::validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
        }

        Ok(())
    }

    /// Replace the plaintext password with its hash.
    ///
    /// Does nothing when there is no plaintext to hash.
    pub fn before_create(&mut self) -> DomainResult<()> {
        if self.password.is_empty() {
            return Ok(());
        }

        let hash = Password::new(&self.password)?;
        self.encrypted_password = hash.into_string();
        self.password.clear();
        Ok(())
    }

    /// Strip every form of the secret.
    pub fn sanitize(&mut self) {
        self.password.clear();
        self.encrypted_password.clear();
    }

    /// By-value [`User::sanitize`].
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Verify a plaintext password against the stored hash
    pub fn verify_password(&self, plain_text: &str) -> bool {
        !self.encrypted_password.is_empty()
            && Password::from_hash(self.encrypted_password.clone()).verify(plain_text)
    }

    /// Update the display name.
    pub fn rename(&mut self, display_name: String) {
        self.display_name = display_name;
    }
}

/// Display names must contain at least one non-whitespace character.
pub fn validate_display_name(display_name: &str) -> DomainResult<()> {
    if display_name.trim().chars().count() < MIN_DISPLAY_NAME_LENGTH {
        return Err(DomainError::validation("Display name cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User::new("Ann", "ann@example.org", "secret123")
    }

    #[test]
    fn test_new_user_is_unpersisted() {
        let user = ann();
        assert_eq!(user.id, UNASSIGNED_ID);
        assert!(user.encrypted_password.is_empty());
    }

    #[test]
    fn test_validate_accepts_valid_user() {
        assert!(ann().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let user = User::new("Ann", "invalid", "secret123");
        assert!(matches!(user.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_blank_display_name() {
        let user = User::new("   ", "ann@example.org", "secret123");
        assert!(matches!(user.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_requires_password() {
        let user = User::new("Ann", "ann@example.org", "");
        assert_eq!(
            user.validate(),
            Err(DomainError::validation("Password is required"))
        );
    }

    #[test]
    fn test_validate_rejects_short_password() {
        let user = User::new("Ann", "ann@example.org", "short");
        assert!(matches!(user.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_skips_password_once_hashed() {
        let mut user = ann();
        user.before_create().unwrap();
        assert!(user.password.is_empty());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_before_create_hashes_password() {
        let mut user = ann();
        user.before_create().unwrap();

        assert!(user.password.is_empty());
        assert_ne!(user.encrypted_password, "secret123");
        assert!(user.encrypted_password.starts_with("$argon2"));
        assert!(user.verify_password("secret123"));
        assert!(!user.verify_password("secret124"));
    }

    #[test]
    fn test_before_create_without_plaintext_keeps_hash() {
        let mut user = ann();
        user.before_create().unwrap();
        let hash = user.encrypted_password.clone();

        user.before_create().unwrap();
        assert_eq!(user.encrypted_password, hash);
    }

    #[test]
    fn test_sanitize_clears_secret() {
        let mut user = ann();
        user.before_create().unwrap();
        user.sanitize();

        assert!(user.password.is_empty());
        assert!(user.encrypted_password.is_empty());
    }

    #[test]
    fn test_serialization_keeps_hash_and_drops_plaintext() {
        let mut user = ann();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("encrypted_password").is_none());

        user.before_create().unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["encrypted_password"], user.encrypted_password.as_str());

        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("encrypted_password").is_none());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut user = ann();
        user.id = 7;
        user.before_create().unwrap();

        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
