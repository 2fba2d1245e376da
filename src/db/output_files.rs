//! Database operations for test output files.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::test_output_file::{self, ActiveModel, Entity as OutputFile};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert an output file record.
    pub async fn insert_output_file(
        &self,
        test_run_id: Uuid,
        filename: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> AppResult<test_output_file::Model> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            test_run_id: Set(test_run_id),
            filename: Set(filename.to_string()),
            file_path: Set(file_path.to_string()),
            file_size: Set(file_size),
            mime_type: Set(mime_type.to_string()),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert output file: {}", e)))?;

        Ok(result)
    }

    /// Get an output file record by ID.
    pub async fn get_output_file(&self, id: Uuid) -> AppResult<Option<test_output_file::Model>> {
        let result = OutputFile::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get output file: {}", e)))?;

        Ok(result)
    }

    /// List output files of a run, newest first.
    pub async fn list_output_files(
        &self,
        test_run_id: Uuid,
    ) -> AppResult<Vec<test_output_file::Model>> {
        let files = OutputFile::find()
            .filter(test_output_file::Column::TestRunId.eq(test_run_id))
            .order_by_desc(test_output_file::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list output files: {}", e)))?;

        Ok(files)
    }
}
