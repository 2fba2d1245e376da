//! Admin session tokens.
//!
//! A thin wrapper over JWT: login issues a bearer token with a fixed
//! expiry horizon embedding the principal; verification hands the
//! principal back or fails uniformly.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::{AdminPrincipal, UserRole};

/// Fixed session lifetime.
const TOKEN_TTL_HOURS: i64 = 24;

const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: String,
    username: String,
    role: UserRole,
    iat: i64,
    exp: i64,
}

/// Issue a session token for an authenticated user.
pub fn issue_token(secret: &str, user: &user::Model) -> AppResult<String> {
    issue_token_with_ttl(secret, user, Duration::hours(TOKEN_TTL_HOURS))
}

fn issue_token_with_ttl(
    secret: &str,
    user: &user::Model,
    ttl: Duration,
) -> AppResult<String> {
    let role = UserRole::parse(&user.role)
        .ok_or_else(|| AppError::Internal(format!("Unknown stored role '{}'", user.role)))?;

    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Verify a session token and return the embedded principal. Every failure
/// mode (bad signature, expired, malformed) yields the same error.
pub fn verify_token(secret: &str, token: &str) -> AppResult<AdminPrincipal> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()))?;

    Ok(AdminPrincipal {
        user_id,
        username: data.claims.username,
        role: data.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            password_hash: "irrelevant".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let user = test_user();
        let token = issue_token("secret", &user).unwrap();

        let principal = verify_token("secret", &token).unwrap();
        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.username, "operator");
        assert_eq!(principal.role, UserRole::Admin);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = issue_token("secret", &test_user()).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_tampered_token_fails() {
        let token = issue_token("secret", &test_user()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token("secret", &tampered).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let user = test_user();
        // Expired well past the default validation leeway
        let token = issue_token_with_ttl("secret", &user, Duration::hours(-2)).unwrap();
        assert!(matches!(
            verify_token("secret", &token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_unknown_stored_role_refused_at_issue() {
        let user = user::Model {
            role: "superuser".to_string(),
            ..test_user()
        };
        assert!(issue_token("secret", &user).is_err());
    }
}
