//! Database operations for the system configuration store.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::system_config::{self, ActiveModel, Entity as SystemConfig};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Get a configuration entry by key.
    pub async fn get_system_config(&self, key: &str) -> AppResult<Option<system_config::Model>> {
        let result = SystemConfig::find()
            .filter(system_config::Column::ConfigKey.eq(key))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get config: {}", e)))?;

        Ok(result)
    }

    /// Set a configuration value, creating the entry when absent. An empty
    /// description leaves the stored description untouched.
    pub async fn set_system_config(
        &self,
        key: &str,
        value: &str,
        description: &str,
    ) -> AppResult<system_config::Model> {
        let now = Utc::now();

        match self.get_system_config(key).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.config_value = Set(value.to_string());
                if !description.is_empty() {
                    active.description = Set(description.to_string());
                }
                active.updated_at = Set(now);

                let result = active
                    .update(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to update config: {}", e)))?;

                Ok(result)
            }
            None => {
                let model = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    config_key: Set(key.to_string()),
                    config_value: Set(value.to_string()),
                    description: Set(description.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                let result = model
                    .insert(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to create config: {}", e)))?;

                Ok(result)
            }
        }
    }

    /// List all configuration entries.
    pub async fn list_system_configs(&self) -> AppResult<Vec<system_config::Model>> {
        let configs = SystemConfig::find()
            .order_by_asc(system_config::Column::ConfigKey)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list configs: {}", e)))?;

        Ok(configs)
    }
}
