//! API endpoint modules.

pub mod admin;
pub mod api_keys;
pub mod dashboard;
pub mod files;
pub mod health;
pub mod openapi;
pub mod projects;
pub mod system_configs;
pub mod test_runs;

pub use admin::configure_routes as configure_admin_routes;
pub use api_keys::configure_routes as configure_api_key_routes;
pub use dashboard::configure_routes as configure_dashboard_routes;
pub use files::configure_routes as configure_file_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use projects::configure_routes as configure_project_routes;
pub use system_configs::configure_routes as configure_system_config_routes;
pub use test_runs::configure_routes as configure_test_run_routes;
