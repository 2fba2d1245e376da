//! Database module providing connection management and queries.
//!
//! `DbPool` wraps the SeaORM connection pool and is handed to every
//! component explicitly via actix app data; nothing reads a global handle.

pub mod api_keys;
pub mod output_files;
pub mod projects;
pub mod system_configs;
pub mod test_cases;
pub mod test_runs;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the database from configuration.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut opts = ConnectOptions::new(&config.database_url);
        opts.max_connections(10)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection. Intended for tests running against a
    /// `MockDatabase` connection.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get access to the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Translate an insert/update error, turning a unique-constraint violation
/// into a domain-level Conflict so callers can react to duplicate names.
pub(crate) fn map_write_err(err: DbErr, conflict_message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(conflict_message.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
