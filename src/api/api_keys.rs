//! API key management endpoints (admin).

use actix_web::{delete, get, post, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{ApiKeyCreateResponse, ApiKeyListItem, CreateApiKeyRequest};
use crate::services::api_key;

#[derive(Debug, Serialize, ToSchema)]
pub struct ListApiKeysResponse {
    pub keys: Vec<ApiKeyListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteApiKeyResponse {
    pub message: String,
    pub id: Uuid,
}

/// List API keys.
///
/// GET /api/v1/admin/api-keys
#[utoipa::path(
    get,
    path = "/api/v1/admin/api-keys",
    tag = "ApiKeys",
    responses(
        (status = 200, description = "All API keys", body = ListApiKeysResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/api-keys")]
pub async fn list_api_keys(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let keys = api_key::list_keys(pool.get_ref()).await?;
    let items: Vec<ApiKeyListItem> = keys.into_iter().map(ApiKeyListItem::from).collect();

    Ok(HttpResponse::Ok().json(ListApiKeysResponse { keys: items }))
}

/// Create an API key. The full token appears in this response only.
///
/// POST /api/v1/admin/api-keys
#[utoipa::path(
    post,
    path = "/api/v1/admin/api-keys",
    tag = "ApiKeys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = ApiKeyCreateResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[post("/admin/api-keys")]
pub async fn create_api_key(
    _auth: AdminAuth,
    body: web::Json<CreateApiKeyRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let (full_token, key) = api_key::create_key(
        pool.get_ref(),
        &config.api_key_salt,
        &body.name,
        body.project_id,
        body.expires_in.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(ApiKeyCreateResponse {
        id: key.id,
        key: full_token,
        key_id: key.key_id,
        name: key.name,
        project_id: key.project_id,
        expires_at: key.expires_at,
        created_at: key.created_at,
    }))
}

/// Delete an API key.
///
/// DELETE /api/v1/admin/api-keys/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/api-keys/{id}",
    tag = "ApiKeys",
    params(
        ("id" = Uuid, Path, description = "API key record ID")
    ),
    responses(
        (status = 200, description = "API key deleted", body = DeleteApiKeyResponse),
        (status = 404, description = "API key not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[delete("/admin/api-keys/{id}")]
pub async fn delete_api_key(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    api_key::delete_key(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(DeleteApiKeyResponse {
        message: "API key deleted".to_string(),
        id,
    }))
}

/// Configure API key routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_api_keys)
        .service(create_api_key)
        .service(delete_api_key);
}
