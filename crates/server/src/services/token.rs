//! JWT issuing and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warung_core::{Role, UserId};

use crate::models::User;

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be created.
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Token is malformed, has a bad signature, or is expired.
    #[error("invalid token")]
    Invalid,
}

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i64,
    /// Username at issue time.
    pub username: String,
    /// Role at issue time.
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// The user ID this token was issued for.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Issues and verifies HS256 access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.as_i64(),
            username: user.username.as_str().to_owned(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any verification failure.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warung_core::{Email, Username};

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::new(7),
            username: Username::parse("alice").unwrap(),
            email: Email::parse("alice@example.com").unwrap(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = TokenService::new(b"a-secret-for-tests-only-not-prod", 3600);
        let token = service.issue(&sample_user(Role::Admin)).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway.
        let service = TokenService::new(b"a-secret-for-tests-only-not-prod", -600);
        let token = service.issue(&sample_user(Role::User)).unwrap();

        assert!(matches!(service.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new(b"secret-one-for-tests-only-123456", 3600);
        let verifier = TokenService::new(b"secret-two-for-tests-only-123456", 3600);
        let token = issuer.issue(&sample_user(Role::User)).unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
