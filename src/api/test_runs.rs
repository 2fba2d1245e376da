//! Test run API handlers: the public read surface, the API-key-protected
//! ingestion endpoint, and the admin run management endpoints.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminAuth, ApiKeyAuth};
use crate::db::DbPool;
use crate::entity::test_run;
use crate::error::AppResult;
use crate::models::{
    BranchStats, CreateTestRunRequest, RunListResponse, TestCaseResponse, TestRunDetailResponse,
    TestRunQuery, TestRunResponse, UpdateVisibilityRequest,
};
use crate::services::{stats, test_run as run_service};

/// Branch shown on the public landing dashboard.
const DASHBOARD_BRANCH: &str = "master";

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteRunResponse {
    pub message: String,
    pub id: Uuid,
}

async fn run_detail(pool: &DbPool, run: test_run::Model) -> AppResult<TestRunDetailResponse> {
    let cases = pool.get_test_cases(run.id).await?;
    let files = pool.list_output_files(run.id).await?;

    Ok(TestRunDetailResponse {
        run: run.into(),
        test_cases: cases.into_iter().map(Into::into).collect(),
        output_files: files.into_iter().map(Into::into).collect(),
    })
}

/// List test runs (public).
///
/// GET /api/v1/test-runs
#[utoipa::path(
    get,
    path = "/api/v1/test-runs",
    tag = "TestRuns",
    params(TestRunQuery),
    responses(
        (status = 200, description = "Paginated list of public test runs", body = RunListResponse)
    )
)]
#[get("/test-runs")]
pub async fn list_test_runs(
    query: web::Query<TestRunQuery>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let (runs, total) = pool.query_test_runs(&query, false).await?;

    Ok(HttpResponse::Ok().json(RunListResponse {
        test_runs: runs.into_iter().map(TestRunResponse::from).collect(),
        total,
        page: query.page(),
        page_size: query.page_size(),
    }))
}

/// Get a test run with its cases and output files (public).
///
/// GET /api/v1/test-runs/{id}
#[utoipa::path(
    get,
    path = "/api/v1/test-runs/{id}",
    tag = "TestRuns",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Test run detail", body = TestRunDetailResponse),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/test-runs/{id}")]
pub async fn get_test_run(
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let run = run_service::get_run(pool.get_ref(), path.into_inner(), false).await?;
    let detail = run_detail(pool.get_ref(), run).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// List the cases of a test run (public).
///
/// GET /api/v1/test-runs/{id}/test-cases
#[utoipa::path(
    get,
    path = "/api/v1/test-runs/{id}/test-cases",
    tag = "TestRuns",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Cases of the run", body = [TestCaseResponse]),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/test-runs/{id}/test-cases")]
pub async fn list_test_cases(
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let run = run_service::get_run(pool.get_ref(), path.into_inner(), false).await?;
    let cases = pool.get_test_cases(run.id).await?;

    let responses: Vec<TestCaseResponse> = cases.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// Latest statistics for the master branch (public).
///
/// GET /api/v1/stats/master
#[utoipa::path(
    get,
    path = "/api/v1/stats/master",
    tag = "TestRuns",
    responses(
        (status = 200, description = "Latest master branch statistics", body = BranchStats),
        (status = 404, description = "No run on the branch", body = crate::error::ErrorResponse)
    )
)]
#[get("/stats/master")]
pub async fn master_branch_stats(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let stats = stats::branch_latest_stats(pool.get_ref(), DASHBOARD_BRANCH, true).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Ingest a test run with its cases.
///
/// POST /api/v1/test-runs
/// Authorization: X-API-Key or Bearer API token
#[utoipa::path(
    post,
    path = "/api/v1/test-runs",
    tag = "TestRuns",
    request_body = CreateTestRunRequest,
    responses(
        (status = 201, description = "Test run created", body = TestRunDetailResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/test-runs")]
pub async fn create_test_run(
    _auth: ApiKeyAuth,
    body: web::Json<CreateTestRunRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let run = run_service::ingest_run(pool.get_ref(), &body.into_inner()).await?;
    let detail = run_detail(pool.get_ref(), run).await?;

    Ok(HttpResponse::Created().json(detail))
}

/// List test runs including private ones (admin).
///
/// GET /api/v1/admin/test-runs
#[utoipa::path(
    get,
    path = "/api/v1/admin/test-runs",
    tag = "Admin",
    params(TestRunQuery),
    responses(
        (status = 200, description = "Paginated list of all test runs", body = RunListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/test-runs")]
pub async fn admin_list_test_runs(
    _auth: AdminAuth,
    query: web::Query<TestRunQuery>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let (runs, total) = pool.query_test_runs(&query, true).await?;

    Ok(HttpResponse::Ok().json(RunListResponse {
        test_runs: runs.into_iter().map(TestRunResponse::from).collect(),
        total,
        page: query.page(),
        page_size: query.page_size(),
    }))
}

/// Delete a test run (admin).
///
/// DELETE /api/v1/admin/test-runs/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/test-runs/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Test run deleted", body = DeleteRunResponse),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[delete("/admin/test-runs/{id}")]
pub async fn admin_delete_test_run(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    run_service::delete_run(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(DeleteRunResponse {
        message: "Test run deleted".to_string(),
        id,
    }))
}

/// Update a test run's visibility (admin).
///
/// PUT /api/v1/admin/test-runs/{id}/visibility
#[utoipa::path(
    put,
    path = "/api/v1/admin/test-runs/{id}/visibility",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = TestRunResponse),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[put("/admin/test-runs/{id}/visibility")]
pub async fn admin_update_visibility(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    body: web::Json<UpdateVisibilityRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let run =
        run_service::set_visibility(pool.get_ref(), path.into_inner(), body.is_public).await?;

    Ok(HttpResponse::Ok().json(TestRunResponse::from(run)))
}

/// Configure test run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_test_runs)
        .service(get_test_run)
        .service(list_test_cases)
        .service(master_branch_stats)
        .service(create_test_run)
        .service(admin_list_test_runs)
        .service(admin_delete_test_run)
        .service(admin_update_visibility);
}
