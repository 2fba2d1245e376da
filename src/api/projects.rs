//! Project management endpoints (admin).

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteProjectResponse {
    pub message: String,
    pub id: Uuid,
}

/// List projects.
///
/// GET /api/v1/admin/projects
#[utoipa::path(
    get,
    path = "/api/v1/admin/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "All projects", body = [ProjectResponse]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/projects")]
pub async fn list_projects(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let projects = pool.list_projects().await?;
    let responses: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// Get a project.
///
/// GET /api/v1/admin/projects/{id}
#[utoipa::path(
    get,
    path = "/api/v1/admin/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project detail", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/projects/{id}")]
pub async fn get_project(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let project = pool
        .get_project(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Create a project. A duplicate name yields 409.
///
/// POST /api/v1/admin/projects
#[utoipa::path(
    post,
    path = "/api/v1/admin/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already exists", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[post("/admin/projects")]
pub async fn create_project(
    _auth: AdminAuth,
    body: web::Json<CreateProjectRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }

    let project = pool
        .insert_project(body.name.trim(), &body.description)
        .await?;

    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Update a project.
///
/// PUT /api/v1/admin/projects/{id}
#[utoipa::path(
    put,
    path = "/api/v1/admin/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already exists", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[put("/admin/projects/{id}")]
pub async fn update_project(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }

    let project = pool
        .update_project(path.into_inner(), body.name.trim(), &body.description)
        .await?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Delete a project and everything it owns.
///
/// DELETE /api/v1/admin/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = DeleteProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[delete("/admin/projects/{id}")]
pub async fn delete_project(
    _auth: AdminAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if !pool.delete_project(id).await? {
        return Err(AppError::NotFound("Project".to_string()));
    }

    Ok(HttpResponse::Ok().json(DeleteProjectResponse {
        message: "Project deleted".to_string(),
        id,
    }))
}

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_projects)
        .service(get_project)
        .service(create_project)
        .service(update_project)
        .service(delete_project);
}
