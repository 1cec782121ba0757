//! Admin user management.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use shoe_store_core::{Email, Role, UserId};

use crate::db::users::{UserChanges, UserRepository};
use crate::models::User;
use crate::services::auth::{
    AuthError, hash_password, map_conflict, validate_password, validate_username,
};

/// Body of admin create/update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    pub email: String,
    /// Required on create; empty or missing keeps the current hash on update.
    #[serde(default)]
    pub password: Option<String>,
    /// Defaults to `User` on create; missing keeps the current role on update.
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserInput {
    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Service for admin CRUD over accounts.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// Get an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if it doesn't exist.
    pub async fn get(&self, id: UserId) -> Result<User, AuthError> {
        self.users.get_by_id(id).await?.ok_or(AuthError::UserNotFound)
    }

    /// Create an account with any role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is missing or too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: &UserInput) -> Result<User, AuthError> {
        let username = validate_username(&input.username)?;
        let email = Email::parse(&input.email)?;
        let password = input
            .password()
            .ok_or_else(|| AuthError::WeakPassword("password is required".to_owned()))?;
        validate_password(password)?;

        let password_hash = hash_password(password).await?;
        let role = input.role.unwrap_or_default();

        let user = self
            .users
            .create(username, &email, &password_hash, role)
            .await
            .map_err(map_conflict)?;

        tracing::info!(user_id = %user.id, %role, "User created by admin");
        Ok(user)
    }

    /// Update an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if it doesn't exist.
    /// Returns `AuthError::UserAlreadyExists` if the new email belongs to another account.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: UserId, input: &UserInput) -> Result<User, AuthError> {
        let username = validate_username(&input.username)?;
        let email = Email::parse(&input.email)?;

        let password_hash = match input.password() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        let changes = UserChanges {
            username: Some(username),
            email: Some(&email),
            password_hash: password_hash.as_deref(),
            role: input.role,
        };

        self.users
            .update(id, &changes)
            .await
            .map_err(map_conflict)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete an account and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), AuthError> {
        if self.users.delete(id).await? {
            tracing::info!(user_id = %id, "User deleted by admin");
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_defaults() {
        let input: UserInput =
            serde_json::from_str(r#"{"username": "li", "email": "li@example.com"}"#).unwrap();
        assert!(input.password().is_none());
        assert!(input.role.is_none());
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let input: UserInput = serde_json::from_str(
            r#"{"username": "li", "email": "li@example.com", "password": "", "role": "Admin"}"#,
        )
        .unwrap();
        assert!(input.password().is_none());
        assert_eq!(input.role, Some(Role::Admin));
    }
}
