//! Test case domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::test_case;

/// Outcome of a single test case. Unknown values are rejected when the
/// ingestion request is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A test case as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestCaseResponse {
    pub id: Uuid,
    pub test_run_id: Uuid,
    pub name: String,
    pub status: String,
    pub duration_ms: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<test_case::Model> for TestCaseResponse {
    fn from(m: test_case::Model) -> Self {
        Self {
            id: m.id,
            test_run_id: m.test_run_id,
            name: m.name,
            status: m.status,
            duration_ms: m.duration_ms,
            error_log: m.error_log,
            debug_log: m.debug_log,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_status_roundtrip() {
        for s in ["passed", "failed", "skipped"] {
            assert_eq!(CaseStatus::parse(s).map(|v| v.as_str()), Some(s));
        }
        assert_eq!(CaseStatus::parse("timedOut"), None);
    }
}
