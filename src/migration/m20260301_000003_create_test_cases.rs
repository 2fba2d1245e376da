//! Migration: Create test_cases table.
//!
//! Log columns carry the 2048-character ingestion bound; rows are
//! immutable after creation.

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
                CREATE TABLE test_cases (
                    id UUID PRIMARY KEY,
                    test_run_id UUID NOT NULL REFERENCES test_runs(id) ON DELETE CASCADE,
                    name VARCHAR(500) NOT NULL,
                    status VARCHAR(20) NOT NULL
                        CHECK (status IN ('passed', 'failed', 'skipped')),
                    duration_ms INTEGER NOT NULL DEFAULT 0 CHECK (duration_ms >= 0),
                    error_log VARCHAR(2048),
                    debug_log VARCHAR(2048),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_test_cases_test_run_id ON test_cases(test_run_id);
                CREATE INDEX idx_test_cases_name ON test_cases(name);
                CREATE INDEX idx_test_cases_status ON test_cases(status);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS test_cases CASCADE;")
            .await?;

        Ok(())
    }
}
