//! Administrative user accounts: registration, authentication, password
//! changes. Password hashing goes through the same slow argon2 scheme as
//! API key secrets.

use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::UserRole;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 6;

/// Login failures are uniform: an unknown username reads the same as a
/// wrong password.
const BAD_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Create a user. A duplicate username surfaces as Conflict via the
/// storage-layer unique constraint.
pub async fn create_user(
    pool: &DbPool,
    username: &str,
    password: &str,
    role: UserRole,
) -> AppResult<user::Model> {
    let username = username.trim();
    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH || length > MAX_USERNAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }

    validate_password(password)?;

    let password_hash = password_auth::generate_hash(password);
    pool.insert_user(username, &password_hash, role).await
}

/// Authenticate a username/password pair.
pub async fn authenticate(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> AppResult<user::Model> {
    let user = pool
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_string()))?;

    password_auth::verify_password(password, &user.password_hash)
        .map_err(|_| AppError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_string()))?;

    Ok(user)
}

/// Change a user's password after verifying the current one.
pub async fn update_password(
    pool: &DbPool,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> AppResult<()> {
    let user = pool
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    password_auth::verify_password(old_password, &user.password_hash)
        .map_err(|_| AppError::Unauthorized("Current password is incorrect".to_string()))?;

    validate_password(new_password)?;

    let password_hash = password_auth::generate_hash(new_password);
    pool.update_user_password(user_id, &password_hash).await
}

/// Fetch a user's profile.
pub async fn get_user(pool: &DbPool, user_id: Uuid) -> AppResult<user::Model> {
    pool.find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(password: &str) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            password_hash: password_auth::generate_hash(password),
            role: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_short_username_rejected_before_any_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let pool = DbPool::from_connection(db);

        let result = create_user(&pool, "ab", "password", UserRole::Admin).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_any_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let pool = DbPool::from_connection(db);

        let result = create_user(&pool, "operator", "short", UserRole::Admin).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_authenticate_accepts_correct_password() {
        let user = user_model("correct horse");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let found = authenticate(&pool, "operator", "correct horse").await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_authenticate_uniform_failures() {
        // Wrong password
        let user = user_model("correct horse");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let wrong_password = authenticate(&pool, "operator", "battery staple").await;

        // Unknown user
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let unknown_user = authenticate(&pool, "ghost", "battery staple").await;

        match (wrong_password, unknown_user) {
            (Err(AppError::Unauthorized(a)), Err(AppError::Unauthorized(b))) => {
                assert_eq!(a, b);
            }
            other => panic!("expected uniform Unauthorized, got {:?}", other.0.is_ok()),
        }
    }
}
