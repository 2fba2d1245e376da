//! Database queries for test cases, including the aggregation primitives
//! backing the dashboard and per-run summaries.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait as _};
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_run;
use crate::error::{AppError, AppResult};
use crate::models::{CaseStatus, TestCaseInput};

use super::DbPool;

/// Cases are written in bounded batches to keep a single ingestion payload
/// from turning into one enormous INSERT.
const INSERT_BATCH_SIZE: usize = 100;

/// Per-run case counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseTally {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub duration_ms: i64,
}

#[derive(FromQueryResult)]
struct DurationSumRow {
    total: Option<i64>,
}

impl DbPool {
    /// Insert a batch of cases for a run in chunks of [`INSERT_BATCH_SIZE`].
    ///
    /// Validation happens in the lifecycle engine before this is called;
    /// a failure here leaves the owning run in `running` state.
    pub async fn insert_test_cases(
        &self,
        test_run_id: Uuid,
        cases: &[TestCaseInput],
    ) -> AppResult<()> {
        if cases.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let models: Vec<test_case::ActiveModel> = cases
            .iter()
            .map(|c| test_case::ActiveModel {
                id: Set(Uuid::new_v4()),
                test_run_id: Set(test_run_id),
                name: Set(c.name.clone()),
                status: Set(c.status.as_str().to_string()),
                duration_ms: Set(Ord::max(c.duration_ms, 0)),
                error_log: Set(c.error_log.clone()),
                debug_log: Set(c.debug_log.clone()),
                created_at: Set(now),
            })
            .collect();

        for chunk in models.chunks(INSERT_BATCH_SIZE) {
            TestCase::insert_many(chunk.to_vec())
                .exec(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert test cases: {}", e)))?;
        }

        Ok(())
    }

    /// All cases of a run, failures first, then by name.
    pub async fn get_test_cases(&self, test_run_id: Uuid) -> AppResult<Vec<test_case::Model>> {
        let cases = TestCase::find()
            .filter(test_case::Column::TestRunId.eq(test_run_id))
            .order_by(test_case::Column::Status, Order::Desc)
            .order_by(test_case::Column::Name, Order::Asc)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test cases: {}", e)))?;

        Ok(cases)
    }

    /// Count and duration totals for one run's cases.
    pub async fn case_tally(&self, test_run_id: Uuid) -> AppResult<CaseTally> {
        let total = TestCase::find()
            .filter(test_case::Column::TestRunId.eq(test_run_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        if total == 0 {
            return Ok(CaseTally::default());
        }

        let mut tally = CaseTally {
            total,
            ..Default::default()
        };

        for status in [CaseStatus::Passed, CaseStatus::Failed, CaseStatus::Skipped] {
            let count = TestCase::find()
                .filter(test_case::Column::TestRunId.eq(test_run_id))
                .filter(test_case::Column::Status.eq(status.as_str()))
                .count(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

            match status {
                CaseStatus::Passed => tally.passed = count,
                CaseStatus::Failed => tally.failed = count,
                CaseStatus::Skipped => tally.skipped = count,
            }
        }

        let row = TestCase::find()
            .select_only()
            .column_as(
                Expr::col((test_case::Entity, test_case::Column::DurationMs)).sum(),
                "total",
            )
            .filter(test_case::Column::TestRunId.eq(test_run_id))
            .into_model::<DurationSumRow>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to sum case durations: {}", e)))?;

        tally.duration_ms = row.and_then(|r| r.total).unwrap_or(0);

        Ok(tally)
    }

    /// Global case count for one status, optionally restricted to cases of
    /// runs created before the given boundary.
    pub async fn count_cases_with_status(
        &self,
        status: CaseStatus,
        runs_created_before: Option<DateTime<Utc>>,
    ) -> AppResult<u64> {
        let mut select = TestCase::find().filter(test_case::Column::Status.eq(status.as_str()));

        if let Some(before) = runs_created_before {
            select = select
                .join(JoinType::InnerJoin, test_case::Relation::TestRun.def())
                .filter(test_run::Column::CreatedAt.lt(before));
        }

        let count = select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        Ok(count)
    }

    /// Global (sum of durations in ms, case count), optionally restricted to
    /// cases of runs created before the boundary. Average is derived by the
    /// aggregation engine.
    pub async fn case_duration_totals(
        &self,
        runs_created_before: Option<DateTime<Utc>>,
    ) -> AppResult<(i64, u64)> {
        let mut count_select = TestCase::find();
        let mut sum_select = TestCase::find().select_only().column_as(
            Expr::col((test_case::Entity, test_case::Column::DurationMs)).sum(),
            "total",
        );

        if let Some(before) = runs_created_before {
            count_select = count_select
                .join(JoinType::InnerJoin, test_case::Relation::TestRun.def())
                .filter(test_run::Column::CreatedAt.lt(before));
            sum_select = sum_select
                .join(JoinType::InnerJoin, test_case::Relation::TestRun.def())
                .filter(test_run::Column::CreatedAt.lt(before));
        }

        let count = count_select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        let row = sum_select
            .into_model::<DurationSumRow>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to sum case durations: {}", e)))?;

        Ok((row.and_then(|r| r.total).unwrap_or(0), count))
    }
}
