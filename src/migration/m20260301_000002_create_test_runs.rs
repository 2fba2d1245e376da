//! Migration: Create test_runs table.

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
                CREATE TABLE test_runs (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    branch_name VARCHAR(255) NOT NULL,
                    commit_id VARCHAR(40) NOT NULL,
                    commit_short_id VARCHAR(10) NOT NULL,
                    test_type VARCHAR(50) NOT NULL DEFAULT 'gvisor',
                    status VARCHAR(20) NOT NULL DEFAULT 'running'
                        CHECK (status IN ('running', 'passed', 'failed', 'cancelled')),
                    is_public BOOLEAN NOT NULL DEFAULT TRUE,

                    started_at TIMESTAMPTZ,
                    completed_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_test_runs_project_id ON test_runs(project_id);
                CREATE INDEX idx_test_runs_branch_name ON test_runs(branch_name);
                CREATE INDEX idx_test_runs_commit_id ON test_runs(commit_id);
                CREATE INDEX idx_test_runs_commit_short_id ON test_runs(commit_short_id);
                CREATE INDEX idx_test_runs_status ON test_runs(status);
                CREATE INDEX idx_test_runs_is_public ON test_runs(is_public);
                CREATE INDEX idx_test_runs_created_at ON test_runs(created_at);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS test_runs CASCADE;")
            .await?;

        Ok(())
    }
}
