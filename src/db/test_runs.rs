//! Database queries for test runs: lifecycle writes, the filtered query
//! engine, and the run-level aggregation primitives.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait as _};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::entity::test_case;
use crate::entity::test_run::{self, ActiveModel, Entity as TestRun};
use crate::error::{AppError, AppResult};
use crate::models::{RunStatus, TestRunQuery, TrendPoint};

use super::DbPool;

#[derive(FromQueryResult)]
struct TrendRow {
    date: chrono::NaiveDate,
    count: i64,
}

impl DbPool {
    /// Insert a new run in the `running` state.
    pub async fn insert_test_run(
        &self,
        project_id: Uuid,
        branch_name: &str,
        commit_id: &str,
        commit_short_id: &str,
        test_type: &str,
    ) -> AppResult<test_run::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(project_id),
            branch_name: Set(branch_name.to_string()),
            commit_id: Set(commit_id.to_string()),
            commit_short_id: Set(commit_short_id.to_string()),
            test_type: Set(test_type.to_string()),
            status: Set(RunStatus::Running.as_str().to_string()),
            is_public: Set(true),
            started_at: Set(Some(now)),
            completed_at: Set(None),
            created_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test run: {}", e)))?;

        Ok(result)
    }

    /// Get a run by ID.
    pub async fn get_test_run(&self, id: Uuid) -> AppResult<Option<test_run::Model>> {
        let result = TestRun::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test run: {}", e)))?;

        Ok(result)
    }

    /// Move a run to a terminal status. `completed_at` is set exactly when
    /// the new status is terminal, keeping the lifecycle invariant.
    pub async fn complete_test_run(
        &self,
        id: Uuid,
        status: RunStatus,
    ) -> AppResult<test_run::Model> {
        let run = self
            .get_test_run(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

        let mut active: ActiveModel = run.into();
        active.status = Set(status.as_str().to_string());
        active.completed_at = Set(if status.is_terminal() {
            Some(Utc::now())
        } else {
            None
        });

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to complete test run: {}", e)))?;

        Ok(result)
    }

    /// Flip a run's visibility flag.
    pub async fn set_test_run_visibility(
        &self,
        id: Uuid,
        is_public: bool,
    ) -> AppResult<test_run::Model> {
        let run = self
            .get_test_run(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

        let mut active: ActiveModel = run.into();
        active.is_public = Set(is_public);

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update visibility: {}", e)))?;

        Ok(result)
    }

    /// Delete a run. Cases and output file records go with it via the
    /// foreign key cascade. Returns false when the run does not exist.
    pub async fn delete_test_run(&self, id: Uuid) -> AppResult<bool> {
        let result = TestRun::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test run: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// Query runs with filters and pagination.
    ///
    /// The total is counted over the filtered set before the page window is
    /// applied, so pagination metadata stays correct. When `include_private`
    /// is false only public runs are visible; callers cannot override this
    /// through the query parameters.
    ///
    /// The test-case-name filter joins against cases, so a run with several
    /// matching cases occupies one row per match.
    pub async fn query_test_runs(
        &self,
        query: &TestRunQuery,
        include_private: bool,
    ) -> AppResult<(Vec<test_run::Model>, u64)> {
        let mut select = TestRun::find();

        if !include_private {
            select = select.filter(test_run::Column::IsPublic.eq(true));
        }

        if let Some(ref branch) = query.branch
            && !branch.is_empty()
        {
            select = select.filter(test_run::Column::BranchName.contains(branch));
        }

        if let Some(ref commit) = query.commit_id
            && !commit.is_empty()
        {
            select = select.filter(
                Condition::any()
                    .add(test_run::Column::CommitId.starts_with(commit))
                    .add(test_run::Column::CommitShortId.starts_with(commit)),
            );
        }

        if let Some(ref test_type) = query.test_type
            && !test_type.is_empty()
        {
            select = select.filter(test_run::Column::TestType.eq(test_type));
        }

        if let Some(status) = query.status_filter() {
            select = select.filter(test_run::Column::Status.eq(status));
        }

        if let Some(start) = query.start_time {
            select = select.filter(test_run::Column::CreatedAt.gte(start));
        }

        if let Some(end) = query.end_time {
            select = select.filter(test_run::Column::CreatedAt.lte(end));
        }

        if let Some(ref case_name) = query.test_case_name
            && !case_name.is_empty()
        {
            select = select
                .join(JoinType::InnerJoin, test_run::Relation::TestCases.def())
                .filter(test_case::Column::Name.contains(case_name));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test runs: {}", e)))?;

        let runs = select
            .order_by_desc(test_run::Column::CreatedAt)
            .offset(query.offset())
            .limit(query.page_size())
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test runs: {}", e)))?;

        Ok((runs, total))
    }

    /// Most recent run on a branch, preferring terminal runs.
    ///
    /// Falls back to the most recent run of any status when the branch has
    /// no completed run yet; returns None when the branch has no runs.
    pub async fn latest_run_on_branch(
        &self,
        branch: &str,
        public_only: bool,
    ) -> AppResult<Option<test_run::Model>> {
        let mut base = TestRun::find().filter(test_run::Column::BranchName.eq(branch));
        if public_only {
            base = base.filter(test_run::Column::IsPublic.eq(true));
        }

        let completed = base
            .clone()
            .filter(test_run::Column::Status.is_in([
                RunStatus::Passed.as_str(),
                RunStatus::Failed.as_str(),
            ]))
            .order_by_desc(test_run::Column::CreatedAt)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query latest run: {}", e)))?;

        if completed.is_some() {
            return Ok(completed);
        }

        let any = base
            .order_by_desc(test_run::Column::CreatedAt)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query latest run: {}", e)))?;

        Ok(any)
    }

    /// Count runs created in the half-open window [from, before).
    pub async fn count_runs(
        &self,
        created_from: Option<DateTime<Utc>>,
        created_before: Option<DateTime<Utc>>,
    ) -> AppResult<u64> {
        let mut select = TestRun::find();

        if let Some(from) = created_from {
            select = select.filter(test_run::Column::CreatedAt.gte(from));
        }
        if let Some(before) = created_before {
            select = select.filter(test_run::Column::CreatedAt.lt(before));
        }

        let total = select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test runs: {}", e)))?;

        Ok(total)
    }

    /// Per-day run counts since the given instant, ascending by date.
    /// Days without runs produce no row.
    pub async fn run_trend(&self, since: DateTime<Utc>) -> AppResult<Vec<TrendPoint>> {
        let day: sea_orm::sea_query::SimpleExpr = Expr::cust("CAST(created_at AS DATE)").into();

        let rows = TestRun::find()
            .select_only()
            .column_as(day.clone(), "date")
            .column_as(
                Expr::col((test_run::Entity, test_run::Column::Id)).count(),
                "count",
            )
            .filter(test_run::Column::CreatedAt.gte(since))
            .group_by(day.clone())
            .order_by_asc(day)
            .into_model::<TrendRow>()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query trend data: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| TrendPoint {
                date: r.date,
                count: r.count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn run_model(status: &str) -> test_run::Model {
        test_run::Model {
            id: Uuid::now_v7(),
            project_id: Uuid::new_v4(),
            branch_name: "master".to_string(),
            commit_id: "a1b2c3d4e5f6".to_string(),
            commit_short_id: "a1b2c3d4e5".to_string(),
            test_type: "gvisor".to_string(),
            status: status.to_string(),
            is_public: true,
            started_at: Some(Utc::now()),
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn latest_run_prefers_terminal() {
        let passed = run_model("passed");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![passed.clone()]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let found = pool.latest_run_on_branch("master", true).await.unwrap();
        assert_eq!(found.map(|r| r.status), Some("passed".to_string()));
    }

    #[tokio::test]
    async fn latest_run_falls_back_to_any_status() {
        let running = run_model("running");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<test_run::Model>::new(), vec![running.clone()]])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let found = pool.latest_run_on_branch("master", true).await.unwrap();
        assert_eq!(found.map(|r| r.status), Some("running".to_string()));
    }

    #[tokio::test]
    async fn latest_run_none_for_unknown_branch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<test_run::Model>::new(), Vec::<test_run::Model>::new()])
            .into_connection();
        let pool = DbPool::from_connection(db);

        let found = pool.latest_run_on_branch("no-such-branch", true).await.unwrap();
        assert!(found.is_none());
    }
}
