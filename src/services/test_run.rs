//! Run lifecycle engine.
//!
//! A run is created in `running`, its cases are ingested as one validated
//! batch, and a terminal status is derived from the case outcomes. All
//! validation happens before the first write; a case-batch failure after
//! the run insert leaves the run in `running` and is surfaced to the
//! caller as a partial failure.

use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::test_run;
use crate::error::{AppError, AppResult};
use crate::models::{CaseStatus, CreateTestRunRequest, RunStatus, TestCaseInput, TestType};

/// Commit ids shorter than this are rejected at ingestion.
pub const MIN_COMMIT_ID_LENGTH: usize = 8;
/// Length of the derived short commit id.
pub const SHORT_COMMIT_ID_LENGTH: usize = 10;
/// Upper bound on each error/debug log, in characters. Longer input
/// rejects the whole batch; nothing is truncated.
pub const MAX_LOG_LENGTH: usize = 2048;

/// Ingestions without a project are attached to this project, created on
/// first use.
const DEFAULT_PROJECT_NAME: &str = "default";

/// Derive the short display id: the first 10 characters of the commit id,
/// or the full id when it is shorter.
pub fn short_commit_id(commit_id: &str) -> String {
    commit_id.chars().take(SHORT_COMMIT_ID_LENGTH).collect()
}

/// Derive the final run status from a non-empty case batch: any failed
/// case fails the run; skipped cases never do.
pub fn derive_run_status(cases: &[TestCaseInput]) -> RunStatus {
    if cases.iter().any(|c| c.status == CaseStatus::Failed) {
        RunStatus::Failed
    } else {
        RunStatus::Passed
    }
}

/// Validate an ingestion request. Runs before any persistence; the first
/// violation rejects the whole request.
pub fn validate_ingestion(req: &CreateTestRunRequest) -> AppResult<()> {
    if req.commit_id.chars().count() < MIN_COMMIT_ID_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "commit_id must be at least {} characters",
            MIN_COMMIT_ID_LENGTH
        )));
    }

    if TestType::parse(&req.test_type).is_none() {
        return Err(AppError::InvalidInput(format!(
            "test_type must be '{}'",
            TestType::Gvisor.as_str()
        )));
    }

    for case in &req.test_cases {
        if let Some(ref log) = case.error_log
            && log.chars().count() > MAX_LOG_LENGTH
        {
            return Err(AppError::InvalidInput(format!(
                "error_log exceeds maximum length of {} characters",
                MAX_LOG_LENGTH
            )));
        }
        if let Some(ref log) = case.debug_log
            && log.chars().count() > MAX_LOG_LENGTH
        {
            return Err(AppError::InvalidInput(format!(
                "debug_log exceeds maximum length of {} characters",
                MAX_LOG_LENGTH
            )));
        }
    }

    Ok(())
}

/// Visibility boundary: on public paths a private run is indistinguishable
/// from a missing one.
pub fn ensure_visible(run: test_run::Model, include_private: bool) -> AppResult<test_run::Model> {
    if !include_private && !run.is_public {
        return Err(AppError::NotFound("Test run".to_string()));
    }
    Ok(run)
}

/// Create a run and ingest its cases.
///
/// The run insert and the case batch are separate writes: if the batch
/// fails the run row stays behind in `running` state and the error is
/// returned as-is. The final status is derived only when the request
/// carries at least one case; an explicit status in the request overrides
/// the derived value.
pub async fn ingest_run(
    pool: &DbPool,
    req: &CreateTestRunRequest,
) -> AppResult<test_run::Model> {
    validate_ingestion(req)?;

    let short_id = short_commit_id(&req.commit_id);
    let project_id = default_project_id(pool).await?;

    let run = pool
        .insert_test_run(
            project_id,
            &req.branch_name,
            &req.commit_id,
            &short_id,
            &req.test_type,
        )
        .await?;

    info!(
        run_id = %run.id,
        branch = %req.branch_name,
        commit = %short_id,
        cases = req.test_cases.len(),
        "test run created"
    );

    if req.test_cases.is_empty() {
        return Ok(run);
    }

    if let Err(err) = pool.insert_test_cases(run.id, &req.test_cases).await {
        warn!(run_id = %run.id, error = %err, "case batch failed; run left in running state");
        return Err(err);
    }

    let final_status = req.status.unwrap_or_else(|| derive_run_status(&req.test_cases));
    let completed = pool.complete_test_run(run.id, final_status).await?;

    info!(run_id = %completed.id, status = %completed.status, "test run completed");

    Ok(completed)
}

/// Fetch a run, enforcing the visibility boundary of the calling path.
pub async fn get_run(
    pool: &DbPool,
    id: Uuid,
    include_private: bool,
) -> AppResult<test_run::Model> {
    let run = pool
        .get_test_run(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

    ensure_visible(run, include_private)
}

/// Delete a run and its dependents.
pub async fn delete_run(pool: &DbPool, id: Uuid) -> AppResult<()> {
    if !pool.delete_test_run(id).await? {
        return Err(AppError::NotFound("Test run".to_string()));
    }
    Ok(())
}

/// Flip a run's visibility.
pub async fn set_visibility(
    pool: &DbPool,
    id: Uuid,
    is_public: bool,
) -> AppResult<test_run::Model> {
    pool.set_test_run_visibility(id, is_public).await
}

/// Resolve the default project, creating it on first ingestion. A lost
/// creation race is resolved by re-reading the row the winner inserted.
async fn default_project_id(pool: &DbPool) -> AppResult<Uuid> {
    if let Some(project) = pool.get_project_by_name(DEFAULT_PROJECT_NAME).await? {
        return Ok(project.id);
    }

    match pool
        .insert_project(DEFAULT_PROJECT_NAME, "Default project")
        .await
    {
        Ok(project) => Ok(project.id),
        Err(AppError::Conflict(_)) => pool
            .get_project_by_name(DEFAULT_PROJECT_NAME)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| {
                AppError::Database("Default project vanished after conflict".to_string())
            }),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn case(status: CaseStatus) -> TestCaseInput {
        TestCaseInput {
            name: "syscall_test".to_string(),
            status,
            duration_ms: 100,
            error_log: None,
            debug_log: None,
        }
    }

    fn request(commit_id: &str, test_type: &str, cases: Vec<TestCaseInput>) -> CreateTestRunRequest {
        CreateTestRunRequest {
            branch_name: "master".to_string(),
            commit_id: commit_id.to_string(),
            test_type: test_type.to_string(),
            status: None,
            test_cases: cases,
        }
    }

    #[test]
    fn test_short_commit_id_truncates_to_ten() {
        assert_eq!(short_commit_id("a1b2c3d4e5f6"), "a1b2c3d4e5");
        assert_eq!(short_commit_id("0123456789abcde"), "0123456789");
    }

    #[test]
    fn test_short_commit_id_keeps_short_ids() {
        assert_eq!(short_commit_id("a1b2c3d4e"), "a1b2c3d4e");
        assert_eq!(short_commit_id("a1b2c3d4"), "a1b2c3d4");
    }

    #[test]
    fn test_derive_status_failed_wins() {
        let cases = vec![
            case(CaseStatus::Passed),
            case(CaseStatus::Failed),
            case(CaseStatus::Passed),
        ];
        assert_eq!(derive_run_status(&cases), RunStatus::Failed);

        let cases = vec![case(CaseStatus::Failed), case(CaseStatus::Skipped)];
        assert_eq!(derive_run_status(&cases), RunStatus::Failed);
    }

    #[test]
    fn test_derive_status_all_passed() {
        let cases = vec![case(CaseStatus::Passed), case(CaseStatus::Passed)];
        assert_eq!(derive_run_status(&cases), RunStatus::Passed);
    }

    #[test]
    fn test_derive_status_skipped_without_failed_passes() {
        let cases = vec![
            case(CaseStatus::Passed),
            case(CaseStatus::Skipped),
            case(CaseStatus::Skipped),
        ];
        assert_eq!(derive_run_status(&cases), RunStatus::Passed);
    }

    #[test]
    fn test_commit_id_boundary() {
        // 7 characters is rejected, 8 is accepted
        let req = request("a1b2c3d", "gvisor", vec![]);
        assert!(validate_ingestion(&req).is_err());

        let req = request("a1b2c3d4", "gvisor", vec![]);
        assert!(validate_ingestion(&req).is_ok());
    }

    #[test]
    fn test_unknown_test_type_rejected() {
        let req = request("a1b2c3d4e5f6", "syzkaller", vec![]);
        assert!(matches!(
            validate_ingestion(&req),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_log_length_boundary() {
        let mut ok = case(CaseStatus::Passed);
        ok.error_log = Some("x".repeat(MAX_LOG_LENGTH));
        let req = request("a1b2c3d4e5f6", "gvisor", vec![ok]);
        assert!(validate_ingestion(&req).is_ok());

        let mut too_long = case(CaseStatus::Passed);
        too_long.error_log = Some("x".repeat(MAX_LOG_LENGTH + 1));
        let req = request("a1b2c3d4e5f6", "gvisor", vec![too_long]);
        assert!(validate_ingestion(&req).is_err());

        let mut too_long_debug = case(CaseStatus::Passed);
        too_long_debug.debug_log = Some("x".repeat(MAX_LOG_LENGTH + 1));
        let req = request("a1b2c3d4e5f6", "gvisor", vec![too_long_debug]);
        assert!(validate_ingestion(&req).is_err());
    }

    #[test]
    fn test_visibility_boundary() {
        let run = test_run::Model {
            id: Uuid::now_v7(),
            project_id: Uuid::new_v4(),
            branch_name: "master".to_string(),
            commit_id: "a1b2c3d4e5f6".to_string(),
            commit_short_id: "a1b2c3d4e5".to_string(),
            test_type: "gvisor".to_string(),
            status: "passed".to_string(),
            is_public: false,
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
            created_at: Utc::now(),
        };

        // Private run: hidden on the public path, visible to admin
        assert!(matches!(
            ensure_visible(run.clone(), false),
            Err(AppError::NotFound(_))
        ));
        assert!(ensure_visible(run.clone(), true).is_ok());

        let public = test_run::Model {
            is_public: true,
            ..run
        };
        assert!(ensure_visible(public, false).is_ok());
    }

    #[tokio::test]
    async fn test_ingestion_rejects_before_any_write() {
        // An empty mock backs the pool: if validation did not run first,
        // the ingest would hit the database and fail differently.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let pool = DbPool::from_connection(db);

        let req = request("a1b2c3d", "gvisor", vec![case(CaseStatus::Passed)]);
        assert!(matches!(
            ingest_run(&pool, &req).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut bad_log = case(CaseStatus::Passed);
        bad_log.debug_log = Some("x".repeat(MAX_LOG_LENGTH + 1));
        let req = request("a1b2c3d4e5f6", "gvisor", vec![bad_log]);
        assert!(matches!(
            ingest_run(&pool, &req).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
