//! Authentication service.
//!
//! Password registration and login, bearer tokens, and self-service profile
//! updates. Argon2 work runs on the blocking thread pool.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use shoe_store_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{UserChanges, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Verified against when a login email is unknown, so both paths cost one
/// argon2 run. Same parameters as `Argon2::default()`.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$CrCTERWx90d81k80DEQEqA$7LgyidqzUoikTAj44pkNQ23PrC2KA49+9wQpnVS2aCc";

/// Body of `PUT /api/auth/me`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Authentication service.
///
/// Handles user registration, login, and profile management.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new shopper account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` if the username is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password).await?;

        let user = self
            .users
            .create(username, &email, &password_hash, Role::User)
            .await
            .map_err(map_conflict)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            // Burn the same work as a real check before refusing
            let _ = verify_password(password, DUMMY_PASSWORD_HASH).await;
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash).await?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update the caller's own profile.
    ///
    /// A new password is only accepted together with the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    /// Returns `AuthError::CurrentPasswordMismatch` if the current password is
    /// missing or wrong.
    /// Returns `AuthError::UserAlreadyExists` if the new email is taken.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        let username = update
            .username
            .as_deref()
            .map(validate_username)
            .transpose()?;
        let email = update.email.as_deref().map(Email::parse).transpose()?;

        let new_hash = match update.new_password.as_deref().filter(|p| !p.is_empty()) {
            Some(new_password) => {
                let current = update
                    .current_password
                    .as_deref()
                    .ok_or(AuthError::CurrentPasswordMismatch)?;
                let stored = self
                    .users
                    .get_password_hash_by_id(user_id)
                    .await?
                    .ok_or(AuthError::UserNotFound)?;
                verify_password(current, &stored)
                    .await
                    .map_err(|_| AuthError::CurrentPasswordMismatch)?;
                validate_password(new_password)?;
                Some(hash_password(new_password).await?)
            }
            None => None,
        };

        let changes = UserChanges {
            username,
            email: email.as_ref(),
            password_hash: new_hash.as_deref(),
            role: None,
        };

        self.users
            .update(user_id, &changes)
            .await
            .map_err(map_conflict)?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Translate a unique-email violation into `UserAlreadyExists`.
pub(crate) fn map_conflict(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Validate and trim a username.
pub(crate) fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidInput("username is required".to_owned()));
    }
    Ok(username)
}

/// Validate password meets requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a hash on the blocking pool.
async fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn test_validate_username_trims() {
        assert_eq!(validate_username("  maria ").unwrap(), "maria");
        assert!(matches!(
            validate_username("   "),
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").await.unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("correct horse battery", &hash).await.is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_verify_against_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_dummy_hash_is_real_argon2_work() {
        let parsed = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(parsed.params.get_decimal("m"), Some(19_456));
        assert_eq!(parsed.params.get_decimal("t"), Some(2));

        assert!(matches!(
            verify_password("any password at all", DUMMY_PASSWORD_HASH).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_map_conflict() {
        assert!(matches!(
            map_conflict(RepositoryError::Conflict("email".to_owned())),
            AuthError::UserAlreadyExists
        ));
        assert!(matches!(
            map_conflict(RepositoryError::NotFound),
            AuthError::Repository(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn test_profile_update_camel_case() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"currentPassword": "old-secret", "newPassword": "new-secret"}"#,
        )
        .unwrap();
        assert_eq!(update.current_password.as_deref(), Some("old-secret"));
        assert_eq!(update.new_password.as_deref(), Some("new-secret"));
        assert!(update.username.is_none());
    }
}
