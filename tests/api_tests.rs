//! HTTP-level tests against a mocked database: visibility boundary on the
//! public paths, ingestion validation order, and authentication gating.

use actix_web::{test, web, App};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use ci_dashboard_lib::api;
use ci_dashboard_lib::auth::AdminKey;
use ci_dashboard_lib::config::{Config, Environment};
use ci_dashboard_lib::db::DbPool;
use ci_dashboard_lib::entity::{test_case, test_output_file, test_run};

const TEST_ADMIN_KEY: &str = "test-admin-key";

fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 8080,
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-jwt-secret".to_string(),
        api_key_salt: "test-salt".to_string(),
        admin_key: Some(TEST_ADMIN_KEY.to_string()),
        storage_dir: std::env::temp_dir(),
        max_file_size: 1024,
        static_dir: None,
    }
}

fn run_model(is_public: bool) -> test_run::Model {
    test_run::Model {
        id: Uuid::now_v7(),
        project_id: Uuid::new_v4(),
        branch_name: "master".to_string(),
        commit_id: "a1b2c3d4e5f6".to_string(),
        commit_short_id: "a1b2c3d4e5".to_string(),
        test_type: "gvisor".to_string(),
        status: "passed".to_string(),
        is_public,
        started_at: Some(Utc::now()),
        completed_at: Some(Utc::now()),
        created_at: Utc::now(),
    }
}

macro_rules! build_app {
    ($conn:expr) => {{
        let config = test_config();
        let admin_key = AdminKey::new(config.admin_key.clone());

        test::init_service(
            App::new()
                .app_data(web::Data::new(DbPool::from_connection($conn)))
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(admin_key))
                .service(
                    web::scope("/api/v1")
                        .configure(api::configure_health_routes)
                        .configure(api::configure_test_run_routes)
                        .configure(api::configure_file_routes),
                ),
        )
        .await
    }};
}

#[actix_rt::test]
async fn health_endpoint_reports_healthy() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn public_detail_returns_public_run() {
    let run = run_model(true);
    let run_id = run.id;

    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![run]])
        .append_query_results([Vec::<test_case::Model>::new()])
        .append_query_results([Vec::<test_output_file::Model>::new()])
        .into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-runs/{}", run_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "passed");
    assert_eq!(body["commit_short_id"], "a1b2c3d4e5");
    assert_eq!(body["test_cases"], serde_json::json!([]));
}

#[actix_rt::test]
async fn public_detail_hides_private_run() {
    let run = run_model(false);
    let run_id = run.id;

    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![run]])
        .into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-runs/{}", run_id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Indistinguishable from a missing run
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn public_file_listing_hides_private_run() {
    let run = run_model(false);
    let run_id = run.id;

    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![run]])
        .into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-runs/{}/files", run_id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn ingestion_requires_credentials() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::post()
        .uri("/api/v1/test-runs")
        .set_json(serde_json::json!({
            "branch_name": "master",
            "commit_id": "a1b2c3d4e5f6",
            "test_type": "gvisor"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn ingestion_rejects_short_commit_id() {
    // Empty mock: validation must fire before any database access
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::post()
        .uri("/api/v1/test-runs")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .set_json(serde_json::json!({
            "branch_name": "master",
            "commit_id": "a1b2c3d",
            "test_type": "gvisor"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn ingestion_rejects_unknown_test_type() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::post()
        .uri("/api/v1/test-runs")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .set_json(serde_json::json!({
            "branch_name": "master",
            "commit_id": "a1b2c3d4e5f6",
            "test_type": "syzkaller"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn ingestion_rejects_unknown_case_status_at_deserialization() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app!(conn);

    let req = test::TestRequest::post()
        .uri("/api/v1/test-runs")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
        .set_json(serde_json::json!({
            "branch_name": "master",
            "commit_id": "a1b2c3d4e5f6",
            "test_type": "gvisor",
            "test_cases": [
                {"name": "t1", "status": "exploded"}
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}
