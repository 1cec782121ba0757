//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! shoe-cli user create -u alice -e alice@example.com -p 'long enough' -r admin
//! ```

use shoe_store_api::services::users::{UserInput, UserService};
use shoe_store_core::{Role, UserId};

use super::{CommandError, connect};

/// Create an account with the given role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the input fails validation, the email is taken, or
/// database operations fail.
pub async fn create(
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<UserId, CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);

    let input = UserInput {
        username: username.to_owned(),
        email: email.to_owned(),
        password: Some(password.to_owned()),
        role: Some(role),
    };
    let user = UserService::new(&pool).create(&input).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}
