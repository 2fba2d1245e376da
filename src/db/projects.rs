//! Database queries for projects.
//!
//! Duplicate names are caught by the unique index and surfaced as
//! Conflict; there is no check-then-insert window.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::project::{self, ActiveModel, Entity as Project};
use crate::error::{AppError, AppResult};

use super::{map_write_err, DbPool};

impl DbPool {
    /// List all projects, oldest first.
    pub async fn list_projects(&self) -> AppResult<Vec<project::Model>> {
        let projects = Project::find()
            .order_by_asc(project::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list projects: {}", e)))?;

        Ok(projects)
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: Uuid) -> AppResult<Option<project::Model>> {
        let result = Project::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))?;

        Ok(result)
    }

    /// Get a project by its unique name.
    pub async fn get_project_by_name(&self, name: &str) -> AppResult<Option<project::Model>> {
        let result = Project::find()
            .filter(project::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))?;

        Ok(result)
    }

    /// Insert a new project. A duplicate name yields Conflict.
    pub async fn insert_project(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<project::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| map_write_err(e, "Project with this name already exists"))?;

        Ok(result)
    }

    /// Update a project's name and description. A duplicate name yields
    /// Conflict.
    pub async fn update_project(
        &self,
        id: Uuid,
        name: &str,
        description: &str,
    ) -> AppResult<project::Model> {
        let project = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        let mut active: ActiveModel = project.into();
        active.name = Set(name.to_string());
        active.description = Set(description.to_string());
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| map_write_err(e, "Project with this name already exists"))?;

        Ok(result)
    }

    /// Delete a project. Runs and API keys go with it via the foreign key
    /// cascade. Returns false when the project does not exist.
    pub async fn delete_project(&self, id: Uuid) -> AppResult<bool> {
        let result = Project::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}
