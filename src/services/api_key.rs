//! API key service: generation, verification, and management.
//!
//! A presented token is `cid_<key_id>.<secret>`. The key id is a public
//! lookup handle; the secret is hashed with argon2 over a server-wide salt
//! and never stored. Verification is a single indexed lookup followed by
//! one slow-hash comparison; malformed tokens, unknown key ids, and hash
//! mismatches all fail with the same error.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, RngExt};
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::api_key;
use crate::error::{AppError, AppResult};
use crate::models::AuthenticatedClient;

/// Token prefix.
const KEY_PREFIX: &str = "cid_";
/// Length of the public key id.
const KEY_ID_LENGTH: usize = 12;
/// Entropy of the secret half, in bytes.
const SECRET_BYTES: usize = 32;

/// Single failure message for every verification outcome, so callers can't
/// distinguish unknown ids from wrong secrets or expired keys.
const INVALID_KEY_MESSAGE: &str = "Invalid or expired API key";

/// Generate a fresh token. Returns (full token, key id, secret).
pub fn generate_token() -> (String, String, String) {
    let key_id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_ID_LENGTH)
        .map(char::from)
        .collect();

    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let secret = URL_SAFE_NO_PAD.encode(bytes);

    let full = format!("{}{}.{}", KEY_PREFIX, key_id, secret);
    (full, key_id, secret)
}

/// Split a presented token into (key id, secret). Any structural problem
/// yields None; the caller maps that to the uniform failure.
pub fn parse_token(token: &str) -> Option<(&str, &str)> {
    let rest = token.strip_prefix(KEY_PREFIX)?;
    let (key_id, secret) = rest.split_once('.')?;
    if key_id.len() != KEY_ID_LENGTH || secret.is_empty() {
        return None;
    }
    Some((key_id, secret))
}

/// Hash a secret with the server-wide salt prepended.
pub fn hash_secret(salt: &str, secret: &str) -> String {
    password_auth::generate_hash(format!("{}{}", salt, secret))
}

/// Slow-hash comparison of a presented secret against a stored hash.
pub fn verify_secret(salt: &str, secret: &str, hash: &str) -> bool {
    password_auth::verify_password(format!("{}{}", salt, secret), hash).is_ok()
}

/// Expiry check; a key without `expires_at` never expires.
pub fn is_expired(key: &api_key::Model) -> bool {
    match key.expires_at {
        Some(expires_at) => Utc::now() > expires_at,
        None => false,
    }
}

/// Parse a duration string like "365d", "30d", "1y", "6m", "2w".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>().ok().and_then(Duration::try_days)
    } else if let Some(years) = s.strip_suffix('y') {
        years
            .parse::<i64>()
            .ok()
            .and_then(|y| Duration::try_days(y * 365))
    } else if let Some(months) = s.strip_suffix('m') {
        months
            .parse::<i64>()
            .ok()
            .and_then(|m| Duration::try_days(m * 30))
    } else if let Some(weeks) = s.strip_suffix('w') {
        weeks.parse::<i64>().ok().and_then(Duration::try_weeks)
    } else {
        // Bare numbers count as days
        s.parse::<i64>().ok().and_then(Duration::try_days)
    }
}

/// Resolve an optional expiry duration into an absolute timestamp.
fn expiry_from(expires_in: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match expires_in {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => {
            let d = parse_duration(s).ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid expiration duration: {}", s))
            })?;
            Ok(Some(Utc::now() + d))
        }
    }
}

/// Create and persist a new API key. Returns the full token (shown to the
/// caller exactly once) and the stored record.
pub async fn create_key(
    pool: &DbPool,
    salt: &str,
    name: &str,
    project_id: Option<Uuid>,
    expires_in: Option<&str>,
) -> AppResult<(String, api_key::Model)> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }

    let expires_at = expiry_from(expires_in)?;
    let (full_token, key_id, secret) = generate_token();
    let key_hash = hash_secret(salt, &secret);

    let model = pool
        .insert_api_key(&key_id, &key_hash, name, project_id, expires_at)
        .await?;

    Ok((full_token, model))
}

/// Verify a presented token and return the authenticated client.
///
/// Expiry is checked after the hash comparison succeeds. The last-used
/// update is best-effort: a persistence failure is logged and swallowed.
pub async fn verify_key(
    pool: &DbPool,
    salt: &str,
    presented: &str,
) -> AppResult<AuthenticatedClient> {
    let unauthorized = || AppError::Unauthorized(INVALID_KEY_MESSAGE.to_string());

    let (key_id, secret) = parse_token(presented).ok_or_else(unauthorized)?;

    let key = pool
        .find_api_key_by_key_id(key_id)
        .await?
        .ok_or_else(unauthorized)?;

    if !verify_secret(salt, secret, &key.key_hash) {
        return Err(unauthorized());
    }

    if is_expired(&key) {
        return Err(unauthorized());
    }

    if let Err(err) = pool.touch_api_key(key.id).await {
        warn!(key_id = %key.key_id, error = %err, "failed to update API key last-used timestamp");
    }

    Ok(AuthenticatedClient {
        key_id: Some(key.id),
        name: key.name,
        project_id: key.project_id,
    })
}

/// List all keys.
pub async fn list_keys(pool: &DbPool) -> AppResult<Vec<api_key::Model>> {
    pool.list_api_keys().await
}

/// Delete a key by record id.
pub async fn delete_key(pool: &DbPool, id: Uuid) -> AppResult<()> {
    if !pool.delete_api_key(id).await? {
        return Err(AppError::NotFound("API key".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn key_model(salt: &str, secret: &str, expires_at: Option<DateTime<Utc>>) -> api_key::Model {
        api_key::Model {
            id: Uuid::new_v4(),
            key_id: "AbCdEfGh1234".to_string(),
            key_hash: hash_secret(salt, secret),
            name: "CI".to_string(),
            project_id: None,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_token_shape() {
        let (full, key_id, secret) = generate_token();

        assert!(full.starts_with(KEY_PREFIX));
        assert_eq!(key_id.len(), KEY_ID_LENGTH);
        assert!(!secret.is_empty());
        assert_eq!(full, format!("{}{}.{}", KEY_PREFIX, key_id, secret));

        let parsed = parse_token(&full);
        assert_eq!(parsed, Some((key_id.as_str(), secret.as_str())));
    }

    #[test]
    fn test_parse_token_rejects_malformed() {
        assert_eq!(parse_token(""), None);
        assert_eq!(parse_token("not-a-key"), None);
        // Missing separator
        assert_eq!(parse_token("cid_AbCdEfGh1234secret"), None);
        // Wrong key id length
        assert_eq!(parse_token("cid_short.secret"), None);
        // Empty secret
        assert_eq!(parse_token("cid_AbCdEfGh1234."), None);
        // Wrong prefix
        assert_eq!(parse_token("xyz_AbCdEfGh1234.secret"), None);
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_secret("server-salt", "the-secret");

        assert!(verify_secret("server-salt", "the-secret", &hash));
        assert!(!verify_secret("server-salt", "wrong-secret", &hash));
        assert!(!verify_secret("other-salt", "the-secret", &hash));
    }

    #[test]
    fn test_expiry_one_second_in_the_past() {
        let salt = "s";
        let expired = key_model(salt, "x", Some(Utc::now() - Duration::seconds(1)));
        assert!(is_expired(&expired));

        let unexpired = key_model(salt, "x", Some(Utc::now() + Duration::hours(1)));
        assert!(!is_expired(&unexpired));

        let never = key_model(salt, "x", None);
        assert!(!is_expired(&never));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30d").map(|d| d.num_days()), Some(30));
        assert_eq!(parse_duration("1y").map(|d| d.num_days()), Some(365));
        assert_eq!(parse_duration("6m").map(|d| d.num_days()), Some(180));
        assert_eq!(parse_duration("2w").map(|d| d.num_days()), Some(14));
        assert_eq!(parse_duration("14").map(|d| d.num_days()), Some(14));
        assert_eq!(parse_duration("invalid"), None);
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_key_with_correct_secret() {
        let salt = "server-salt";
        let secret = "matching-secret";
        let key = key_model(salt, secret, Some(Utc::now() - Duration::seconds(1)));
        let token = format!("{}{}.{}", KEY_PREFIX, key.key_id, secret);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![key]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let result = verify_key(&pool, salt, &token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_verify_survives_last_used_update_failure() {
        let salt = "server-salt";
        let secret = "matching-secret";
        let key = key_model(salt, secret, None);
        let token = format!("{}{}.{}", KEY_PREFIX, key.key_id, secret);

        // Only the lookup query has a result; the last-used update will
        // fail against the mock and must be swallowed.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![key.clone()]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let client = verify_key(&pool, salt, &token).await.unwrap();
        assert_eq!(client.key_id, Some(key.id));
        assert_eq!(client.name, "CI");
    }

    #[tokio::test]
    async fn test_verify_unknown_key_id_fails_uniformly() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<api_key::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let result = verify_key(&pool, "salt", "cid_AbCdEfGh1234.nope").await;
        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, INVALID_KEY_MESSAGE),
            other => panic!("expected Unauthorized, got {:?}", other.map(|c| c.name)),
        }
    }
}
