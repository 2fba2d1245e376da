//! Derived statistics exposed by the aggregation endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-run summary for the latest run on a branch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BranchStats {
    pub test_run_id: Uuid,
    pub branch_name: String,
    pub commit_id: String,
    pub commit_short_id: String,
    pub test_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub total_cases: u64,
    pub passed_cases: u64,
    pub failed_cases: u64,
    pub skipped_cases: u64,
    /// passed / total * 100, 0 when the run has no cases.
    pub pass_rate: f64,
    /// Sum of case durations in milliseconds.
    pub duration_ms: i64,
}

/// Global dashboard aggregate. The `*_prev` fields are the same metrics
/// recomputed over data older than the 7-day trailing boundary.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_runs: u64,
    pub today_runs: u64,
    /// Pass rate over cases, not runs.
    pub success_rate: f64,
    /// Average case duration in seconds.
    pub avg_duration: f64,
    pub total_runs_prev: u64,
    /// Run count for the prior calendar day.
    pub today_runs_prev: u64,
    pub success_rate_prev: f64,
    pub avg_duration_prev: f64,

    pub success_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
}

/// One day of the run-count trend series. Days without runs are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: i64,
}
