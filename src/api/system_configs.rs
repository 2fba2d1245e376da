//! System configuration endpoints (admin).

use actix_web::{get, put, web, HttpResponse};

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{SystemConfigItem, UpdateSystemConfigRequest};
use crate::services::config as config_service;

/// List all configuration entries.
///
/// GET /api/v1/admin/configs
#[utoipa::path(
    get,
    path = "/api/v1/admin/configs",
    tag = "SystemConfig",
    responses(
        (status = 200, description = "All configuration entries", body = [SystemConfigItem]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/configs")]
pub async fn list_configs(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let configs = config_service::list(pool.get_ref()).await?;
    let items: Vec<SystemConfigItem> = configs.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(items))
}

/// Get one configuration value.
///
/// GET /api/v1/admin/configs/{key}
#[utoipa::path(
    get,
    path = "/api/v1/admin/configs/{key}",
    tag = "SystemConfig",
    params(
        ("key" = String, Path, description = "Configuration key")
    ),
    responses(
        (status = 200, description = "Configuration value", body = SystemConfigItem),
        (status = 404, description = "Unknown key", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/configs/{key}")]
pub async fn get_config(
    _auth: AdminAuth,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let config = pool
        .get_system_config(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Config '{}'", key)))?;

    Ok(HttpResponse::Ok().json(SystemConfigItem::from(config)))
}

/// Set a configuration value, creating the entry when absent.
///
/// PUT /api/v1/admin/configs/{key}
#[utoipa::path(
    put,
    path = "/api/v1/admin/configs/{key}",
    tag = "SystemConfig",
    params(
        ("key" = String, Path, description = "Configuration key")
    ),
    request_body = UpdateSystemConfigRequest,
    responses(
        (status = 200, description = "Configuration updated", body = SystemConfigItem),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[put("/admin/configs/{key}")]
pub async fn update_config(
    _auth: AdminAuth,
    path: web::Path<String>,
    body: web::Json<UpdateSystemConfigRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    if key.trim().is_empty() {
        return Err(AppError::InvalidInput("Config key is required".to_string()));
    }

    let updated =
        config_service::set_value(pool.get_ref(), &key, &body.value, &body.description).await?;

    Ok(HttpResponse::Ok().json(SystemConfigItem::from(updated)))
}

/// Configure system config routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_configs)
        .service(get_config)
        .service(update_config);
}
