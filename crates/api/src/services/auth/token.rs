//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user ID (`sub`) and role (`role`).
//! There is no refresh flow and no revocation list; a token is valid until
//! it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use shoe_store_core::{Role, UserId};

use super::AuthError;
use crate::config::JwtConfig;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as a string.
    pub sub: String,
    /// Account role at issue time.
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The user ID in `sub`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSubject` if `sub` is not an integer.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidSubject)
    }
}

/// Signing and verification keys built once from [`JwtConfig`].
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::try_minutes(config.ttl_minutes).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a token for a user, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails or the expiry is
    /// out of range.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, AuthError> {
        self.issue_at(user_id, role, Utc::now())
    }

    fn issue_at(&self, user_id: UserId, role: Role, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::TokenEncoding)?;
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::TokenEncoding)
    }

    /// Verify signature, expiry, issuer and audience, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if any check fails.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(secret: &str, audience: &str) -> JwtConfig {
        JwtConfig {
            secret: SecretString::from(secret),
            issuer: "shoe-store".to_owned(),
            audience: audience.to_owned(),
            ttl_minutes: 60,
        }
    }

    fn keys() -> TokenKeys {
        TokenKeys::new(&config("k8$Fq2!zR7@wP4#nL9^xT1&cV6*bM3%d", "shoe-store-frontend"))
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys();
        let token = keys.issue(UserId::new(42), Role::Admin).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "shoe-store");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let issued = Utc::now() - Duration::hours(3);
        let token = keys.issue_at(UserId::new(1), Role::User, issued).unwrap();

        assert!(matches!(
            keys.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = keys().issue(UserId::new(1), Role::User).unwrap();
        let other = TokenKeys::new(&config(
            "Z9&yX8^wV7%uT6$sR5#qP4@oN3!mL2*k",
            "shoe-store-frontend",
        ));

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = keys().issue(UserId::new(1), Role::User).unwrap();
        let other = TokenKeys::new(&config("k8$Fq2!zR7@wP4#nL9^xT1&cV6*bM3%d", "someone-else"));

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_is_error() {
        let mut config = config("k8$Fq2!zR7@wP4#nL9^xT1&cV6*bM3%d", "shoe-store-frontend");
        config.ttl_minutes = i64::MAX;

        assert!(matches!(
            TokenKeys::new(&config).issue(UserId::new(1), Role::User),
            Err(AuthError::TokenEncoding)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(keys().verify("not.a.token").is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_owned(),
            role: Role::User,
            iss: String::new(),
            aud: String::new(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.user_id(), Err(AuthError::InvalidSubject)));
    }
}
