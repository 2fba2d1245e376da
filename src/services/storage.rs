//! Output file storage on local disk.
//!
//! Files land under `<storage_dir>/test_run_<id>/` with a timestamp
//! suffix to keep repeated uploads of the same name apart. The database
//! record and the file are written file-first; a failed record insert
//! removes the file again.

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::entity::test_output_file;
use crate::error::{AppError, AppResult};

/// Derive the stored filename: `<stem>_<unix-timestamp><ext>`.
pub fn unique_filename(filename: &str, timestamp: i64) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, timestamp, ext),
        None => format!("{}_{}", stem, timestamp),
    }
}

/// Guess the MIME type from the extension.
pub fn mime_for(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(actix_files::file_extension_to_mime)
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Persist an uploaded output file for a run and record it.
pub async fn save_output_file(
    pool: &DbPool,
    config: &Config,
    test_run_id: Uuid,
    filename: &str,
    data: &[u8],
) -> AppResult<test_output_file::Model> {
    if data.len() > config.max_file_size {
        return Err(AppError::InvalidInput("File size exceeds limit".to_string()));
    }

    // Strip any directory components a client might smuggle in
    let filename = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Invalid filename".to_string()))?;

    let dir = config.storage_dir.join(format!("test_run_{}", test_run_id));
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to create file directory: {}", e)))?;

    let stored_name = unique_filename(filename, Utc::now().timestamp());
    let path = dir.join(&stored_name);

    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to save file: {}", e)))?;

    let mime_type = mime_for(filename);
    let record = pool
        .insert_output_file(
            test_run_id,
            filename,
            &path.to_string_lossy(),
            data.len() as i64,
            &mime_type,
        )
        .await;

    match record {
        Ok(model) => Ok(model),
        Err(err) => {
            // Keep disk and database in step
            let _ = tokio::fs::remove_file(&path).await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_config(storage_dir: std::path::PathBuf, max_file_size: usize) -> Config {
        Config {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "postgres://test".to_string(),
            jwt_secret: "secret".to_string(),
            api_key_salt: "salt".to_string(),
            admin_key: None,
            storage_dir,
            max_file_size,
            static_dir: None,
        }
    }

    #[test]
    fn test_unique_filename() {
        assert_eq!(unique_filename("runsc.log", 1700000000), "runsc_1700000000.log");
        assert_eq!(unique_filename("core", 1700000000), "core_1700000000");
        assert_eq!(
            unique_filename("report.tar.gz", 1700000000),
            "report.tar_1700000000.gz"
        );
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("runsc.log"), "text/plain");
        assert_eq!(mime_for("report.json"), "application/json");
        assert_eq!(mime_for("core"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_size_cap_rejected_before_any_write() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path().to_path_buf(), 8);
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let pool = DbPool::from_connection(db);

        let result =
            save_output_file(&pool, &config, Uuid::now_v7(), "big.log", b"way too large").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        // Nothing was written
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_save_writes_file_and_record() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path().to_path_buf(), 1024);
        let run_id = Uuid::now_v7();

        let stored = test_output_file::Model {
            id: Uuid::new_v4(),
            test_run_id: run_id,
            filename: "runsc.log".to_string(),
            file_path: "ignored-by-mock".to_string(),
            file_size: 5,
            mime_type: "text/plain".to_string(),
            created_at: Utc::now(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let model = save_output_file(&pool, &config, run_id, "runsc.log", b"hello")
            .await
            .unwrap();
        assert_eq!(model.filename, "runsc.log");

        let run_dir = tmp.path().join(format!("test_run_{}", run_id));
        let entries: Vec<_> = std::fs::read_dir(&run_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
