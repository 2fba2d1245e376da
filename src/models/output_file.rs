//! Test output file domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_output_file;

/// An output file record as exposed by the API. The on-disk path stays
/// server-side; downloads go through the file endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutputFileResponse {
    pub id: Uuid,
    pub test_run_id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<test_output_file::Model> for OutputFileResponse {
    fn from(m: test_output_file::Model) -> Self {
        Self {
            id: m.id,
            test_run_id: m.test_run_id,
            filename: m.filename,
            file_size: m.file_size,
            mime_type: m.mime_type,
            created_at: m.created_at,
        }
    }
}
