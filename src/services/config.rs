//! System configuration reads and writes, used as a feature-flag store.

use crate::db::DbPool;
use crate::entity::system_config;
use crate::error::{AppError, AppResult};

/// Flag gating the output-file upload endpoint. Off unless explicitly set.
pub const ALLOW_UPLOAD_OUTPUT_FILES: &str = "allow_upload_output_files";

/// Get a configuration value by key.
pub async fn get_value(pool: &DbPool, key: &str) -> AppResult<String> {
    pool.get_system_config(key)
        .await?
        .map(|c| c.config_value)
        .ok_or_else(|| AppError::NotFound(format!("Config '{}'", key)))
}

/// Get a boolean configuration value, falling back to the default when the
/// key is absent or unreadable.
pub async fn get_bool_or(pool: &DbPool, key: &str, default: bool) -> bool {
    match pool.get_system_config(key).await {
        Ok(Some(c)) => c.config_value == "true",
        _ => default,
    }
}

/// Set a configuration value with create-if-absent semantics.
pub async fn set_value(
    pool: &DbPool,
    key: &str,
    value: &str,
    description: &str,
) -> AppResult<system_config::Model> {
    pool.set_system_config(key, value, description).await
}

/// List all configuration entries.
pub async fn list(pool: &DbPool) -> AppResult<Vec<system_config::Model>> {
    pool.list_system_configs().await
}

/// Whether clients may upload test output files.
pub async fn is_output_upload_allowed(pool: &DbPool) -> bool {
    get_bool_or(pool, ALLOW_UPLOAD_OUTPUT_FILES, false).await
}
