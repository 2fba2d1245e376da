//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CI Dashboard Server",
        version = "0.3.0",
        description = "API server for recording and browsing CI test runs per branch and commit"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Test run endpoints
        api::test_runs::list_test_runs,
        api::test_runs::get_test_run,
        api::test_runs::list_test_cases,
        api::test_runs::master_branch_stats,
        api::test_runs::create_test_run,
        api::test_runs::admin_list_test_runs,
        api::test_runs::admin_delete_test_run,
        api::test_runs::admin_update_visibility,
        // File endpoints
        api::files::list_files,
        api::files::download_file,
        api::files::upload_file,
        // Admin console endpoints
        api::admin::login,
        api::admin::register,
        api::admin::profile,
        api::admin::update_password,
        // Project endpoints
        api::projects::list_projects,
        api::projects::get_project,
        api::projects::create_project,
        api::projects::update_project,
        api::projects::delete_project,
        // API key endpoints
        api::api_keys::list_api_keys,
        api::api_keys::create_api_key,
        api::api_keys::delete_api_key,
        // Dashboard endpoints
        api::dashboard::dashboard_stats,
        api::dashboard::dashboard_trend,
        // System config endpoints
        api::system_configs::list_configs,
        api::system_configs::get_config,
        api::system_configs::update_config,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Test runs
            models::RunStatus,
            models::TestType,
            models::CaseStatus,
            models::TestCaseResponse,
            models::TestRunResponse,
            models::TestRunDetailResponse,
            models::RunListResponse,
            models::CreateTestRunRequest,
            models::TestCaseInput,
            models::UpdateVisibilityRequest,
            api::test_runs::DeleteRunResponse,
            // Stats
            models::BranchStats,
            models::DashboardStats,
            models::TrendPoint,
            // Files
            models::OutputFileResponse,
            // Admin console
            models::UserRole,
            models::UserResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::RegisterRequest,
            models::UpdatePasswordRequest,
            api::admin::MessageResponse,
            // Projects
            models::ProjectResponse,
            models::CreateProjectRequest,
            models::UpdateProjectRequest,
            api::projects::DeleteProjectResponse,
            // API keys
            models::ApiKeyCreateResponse,
            models::ApiKeyListItem,
            models::CreateApiKeyRequest,
            api::api_keys::ListApiKeysResponse,
            api::api_keys::DeleteApiKeyResponse,
            // System config
            models::SystemConfigItem,
            models::UpdateSystemConfigRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "TestRuns", description = "Test run ingestion and queries"),
        (name = "Files", description = "Test output file storage"),
        (name = "Admin", description = "Admin console authentication and run management"),
        (name = "Projects", description = "Project management"),
        (name = "ApiKeys", description = "API key management"),
        (name = "Dashboard", description = "Dashboard statistics"),
        (name = "SystemConfig", description = "System configuration store")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key and session token security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Key"),
                    ),
                ),
            );
            components.add_security_scheme(
                "bearer_token",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
