//! Database operations for API keys.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::api_key::{self, ActiveModel, Entity as ApiKey};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert a new API key record.
    pub async fn insert_api_key(
        &self,
        key_id: &str,
        key_hash: &str,
        name: &str,
        project_id: Option<Uuid>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<api_key::Model> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            key_id: Set(key_id.to_string()),
            key_hash: Set(key_hash.to_string()),
            name: Set(name.to_string()),
            project_id: Set(project_id),
            expires_at: Set(expires_at),
            last_used_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert API key: {}", e)))?;

        Ok(result)
    }

    /// Find an API key by its public key id.
    pub async fn find_api_key_by_key_id(
        &self,
        key_id: &str,
    ) -> AppResult<Option<api_key::Model>> {
        let result = ApiKey::find()
            .filter(api_key::Column::KeyId.eq(key_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find API key: {}", e)))?;

        Ok(result)
    }

    /// List all API keys, newest first.
    pub async fn list_api_keys(&self) -> AppResult<Vec<api_key::Model>> {
        let keys = ApiKey::find()
            .order_by_desc(api_key::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list API keys: {}", e)))?;

        Ok(keys)
    }

    /// Delete an API key. Returns false when the key does not exist.
    pub async fn delete_api_key(&self, id: Uuid) -> AppResult<bool> {
        let result = ApiKey::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// Update the last-used timestamp of a key.
    pub async fn touch_api_key(&self, id: Uuid) -> AppResult<()> {
        let model = ApiKey::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find API key: {}", e)))?;

        if let Some(m) = model {
            let mut active: ActiveModel = m.into();
            active.last_used_at = Set(Some(Utc::now()));
            active
                .update(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to touch API key: {}", e)))?;
        }

        Ok(())
    }
}
