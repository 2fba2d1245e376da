//! Admin console authentication and profile endpoints.

use actix_web::{get, post, put, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AdminAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    LoginRequest, LoginResponse, RegisterRequest, UpdatePasswordRequest, UserResponse, UserRole,
};
use crate::services::{session, user as user_service};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Log in to the admin console.
///
/// POST /api/v1/admin/login
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
#[post("/admin/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let user = user_service::authenticate(pool.get_ref(), &body.username, &body.password).await?;
    let token = session::issue_token(&config.jwt_secret, &user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}

/// Register an admin console user.
///
/// POST /api/v1/admin/register
#[utoipa::path(
    post,
    path = "/api/v1/admin/register",
    tag = "Admin",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ErrorResponse)
    )
)]
#[post("/admin/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let role = body.role.unwrap_or(UserRole::Admin);
    let user = user_service::create_user(pool.get_ref(), &body.username, &body.password, role)
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Get the authenticated user's profile.
///
/// GET /api/v1/admin/profile
#[utoipa::path(
    get,
    path = "/api/v1/admin/profile",
    tag = "Admin",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/profile")]
pub async fn profile(auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let user = user_service::get_user(pool.get_ref(), auth.principal.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Change the authenticated user's password.
///
/// PUT /api/v1/admin/profile/password
#[utoipa::path(
    put,
    path = "/api/v1/admin/profile/password",
    tag = "Admin",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[put("/admin/profile/password")]
pub async fn update_password(
    auth: AdminAuth,
    body: web::Json<UpdatePasswordRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    user_service::update_password(
        pool.get_ref(),
        auth.principal.user_id,
        &body.old_password,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// Configure admin auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(register)
        .service(profile)
        .service(update_password);
}
