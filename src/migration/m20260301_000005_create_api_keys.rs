//! Migration: Create api_keys table.
//!
//! key_id is the public half of the presented token and the only lookup
//! path; key_hash is a salted argon2 hash of the secret half.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE api_keys (
                    id UUID PRIMARY KEY,
                    key_id VARCHAR(12) NOT NULL,
                    key_hash VARCHAR(255) NOT NULL,
                    name VARCHAR(255) NOT NULL,
                    project_id UUID REFERENCES projects(id) ON DELETE CASCADE,

                    expires_at TIMESTAMPTZ,
                    last_used_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_api_keys_key_id ON api_keys(key_id);
                CREATE INDEX idx_api_keys_project_id ON api_keys(project_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS api_keys CASCADE;")
            .await?;

        Ok(())
    }
}
