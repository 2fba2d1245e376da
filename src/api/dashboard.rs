//! Dashboard aggregation endpoints (admin).

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{DashboardStats, TrendPoint};
use crate::services::stats;

/// Trend query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendQuery {
    /// Number of days to cover; defaults to 7, clamped to [1, 365].
    pub days: Option<i64>,
}

/// Global dashboard statistics with previous-period comparison figures.
///
/// GET /api/v1/admin/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/dashboard/stats")]
pub async fn dashboard_stats(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let stats = stats::dashboard_stats(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Per-day run counts for the trend chart. Days without runs are omitted.
///
/// GET /api/v1/admin/dashboard/trend
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/trend",
    tag = "Dashboard",
    params(TrendQuery),
    responses(
        (status = 200, description = "Trend series", body = [TrendPoint]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_token" = [])
    )
)]
#[get("/admin/dashboard/trend")]
pub async fn dashboard_trend(
    _auth: AdminAuth,
    query: web::Query<TrendQuery>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let trend = stats::dashboard_trend(pool.get_ref(), query.days).await?;
    Ok(HttpResponse::Ok().json(trend))
}

/// Configure dashboard routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard_stats).service(dashboard_trend);
}
