//! Test run domain types: statuses, ingestion requests, query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::test_run;
use crate::models::test_case::CaseStatus;

/// Default page number when the caller omits or floors it.
const DEFAULT_PAGE: u64 = 1;
/// Default page size when the caller omits or floors it.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Lifecycle state of a test run.
///
/// A run starts in `Running` and moves to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Passed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states carry a completion timestamp; `Running` never does.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepted test suite types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Gvisor,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gvisor => "gvisor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gvisor" => Some(Self::Gvisor),
            _ => None,
        }
    }
}

/// One case descriptor in an ingestion request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TestCaseInput {
    pub name: String,
    pub status: CaseStatus,
    #[serde(default)]
    pub duration_ms: i32,
    #[serde(default)]
    pub error_log: Option<String>,
    #[serde(default)]
    pub debug_log: Option<String>,
}

/// Request to create a test run, optionally with its cases in one shot.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestRunRequest {
    pub branch_name: String,
    pub commit_id: String,
    pub test_type: String,
    /// Explicit final status; overrides the status derived from the cases.
    #[serde(default)]
    pub status: Option<RunStatus>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseInput>,
}

/// Filter and pagination parameters for run queries.
///
/// Visibility is not part of this struct: the entry point decides it.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TestRunQuery {
    /// Branch name substring match.
    pub branch: Option<String>,
    /// Commit id prefix match against the full or short id.
    pub commit_id: Option<String>,
    /// Exact test type.
    pub test_type: Option<String>,
    /// Exact status; "all" or empty means no filter.
    pub status: Option<String>,
    /// Lower bound on creation time (inclusive).
    pub start_time: Option<DateTime<Utc>>,
    /// Upper bound on creation time (inclusive).
    pub end_time: Option<DateTime<Utc>>,
    /// Substring match on test case names (joins against cases).
    pub test_case_name: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl TestRunQuery {
    /// Effective page number; anything below 1 becomes the default.
    pub fn page(&self) -> u64 {
        match self.page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        }
    }

    /// Effective page size; anything below 1 becomes the default.
    pub fn page_size(&self) -> u64 {
        match self.page_size {
            Some(s) if s >= 1 => s as u64,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Row offset of the requested page.
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.page_size()
    }

    /// Status filter with the "all" sentinel resolved away.
    pub fn status_filter(&self) -> Option<&str> {
        match self.status.as_deref() {
            None | Some("") | Some("all") => None,
            Some(s) => Some(s),
        }
    }
}

/// A test run as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestRunResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub branch_name: String,
    pub commit_id: String,
    pub commit_short_id: String,
    pub test_type: String,
    pub status: String,
    pub is_public: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<test_run::Model> for TestRunResponse {
    fn from(m: test_run::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            branch_name: m.branch_name,
            commit_id: m.commit_id,
            commit_short_id: m.commit_short_id,
            test_type: m.test_type,
            status: m.status,
            is_public: m.is_public,
            started_at: m.started_at,
            completed_at: m.completed_at,
            created_at: m.created_at,
        }
    }
}

/// Run detail including its cases and output files.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestRunDetailResponse {
    #[serde(flatten)]
    pub run: TestRunResponse,
    pub test_cases: Vec<crate::models::TestCaseResponse>,
    pub output_files: Vec<crate::models::OutputFileResponse>,
}

/// Paginated run listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunListResponse {
    pub test_runs: Vec<TestRunResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Request to flip a run's visibility.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVisibilityRequest {
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for s in ["running", "passed", "failed", "cancelled"] {
            assert_eq!(RunStatus::parse(s).map(|v| v.as_str()), Some(s));
        }
        assert_eq!(RunStatus::parse("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Passed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_test_type_parse() {
        assert_eq!(TestType::parse("gvisor"), Some(TestType::Gvisor));
        assert_eq!(TestType::parse("syzkaller"), None);
        assert_eq!(TestType::parse(""), None);
    }

    #[test]
    fn test_pagination_defaults() {
        let q = TestRunQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 20);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_pagination_floors_to_defaults() {
        let q = TestRunQuery {
            page: Some(0),
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 20);

        let q = TestRunQuery {
            page: Some(-3),
            page_size: Some(-50),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 20);
    }

    #[test]
    fn test_pagination_offset() {
        let q = TestRunQuery {
            page: Some(3),
            page_size: Some(25),
            ..Default::default()
        };
        assert_eq!(q.page(), 3);
        assert_eq!(q.page_size(), 25);
        assert_eq!(q.offset(), 50);
    }

    #[test]
    fn test_status_filter_all_sentinel() {
        let q = TestRunQuery {
            status: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(q.status_filter(), None);

        let q = TestRunQuery {
            status: Some("failed".to_string()),
            ..Default::default()
        };
        assert_eq!(q.status_filter(), Some("failed"));

        let q = TestRunQuery {
            status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(q.status_filter(), None);
    }
}
