//! Output file endpoints: public listing and download gated by run
//! visibility, and API-key-protected upload gated by a feature flag.

use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use actix_multipart::Multipart;
use futures_util::StreamExt as _;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::OutputFileResponse;
use crate::services::{config as config_service, storage, test_run as run_service};

/// List the output files of a test run (public).
///
/// GET /api/v1/test-runs/{id}/files
#[utoipa::path(
    get,
    path = "/api/v1/test-runs/{id}/files",
    tag = "Files",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    responses(
        (status = 200, description = "Output files of the run", body = [OutputFileResponse]),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/test-runs/{id}/files")]
pub async fn list_files(
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let run = run_service::get_run(pool.get_ref(), path.into_inner(), false).await?;
    let files = pool.list_output_files(run.id).await?;

    let responses: Vec<OutputFileResponse> = files.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// Download an output file (public).
///
/// GET /api/v1/test-runs/{id}/output-files/{file_id}
///
/// A file belonging to a different run is reported as missing, exactly
/// like a file of a private run.
#[utoipa::path(
    get,
    path = "/api/v1/test-runs/{id}/output-files/{file_id}",
    tag = "Files",
    params(
        ("id" = Uuid, Path, description = "Test run ID"),
        ("file_id" = Uuid, Path, description = "Output file ID")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "Test run or file not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/test-runs/{id}/output-files/{file_id}")]
pub async fn download_file(
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let (run_id, file_id) = path.into_inner();

    let run = run_service::get_run(pool.get_ref(), run_id, false).await?;

    let file = pool
        .get_output_file(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File".to_string()))?;

    if file.test_run_id != run.id {
        return Err(AppError::NotFound("File".to_string()));
    }

    let named = NamedFile::open_async(&file.file_path)
        .await
        .map_err(|_| AppError::NotFound("File".to_string()))?
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.filename.clone())],
        });

    Ok(named.into_response(&req))
}

/// Upload an output file for a test run.
///
/// POST /api/v1/test-runs/{id}/output-files
/// Authorization: X-API-Key or Bearer API token
///
/// Disabled unless the `allow_upload_output_files` flag is set.
#[utoipa::path(
    post,
    path = "/api/v1/test-runs/{id}/output-files",
    tag = "Files",
    params(
        ("id" = Uuid, Path, description = "Test run ID")
    ),
    responses(
        (status = 201, description = "File stored", body = OutputFileResponse),
        (status = 400, description = "Invalid upload", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized or uploads disabled", body = crate::error::ErrorResponse),
        (status = 404, description = "Test run not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/test-runs/{id}/output-files")]
pub async fn upload_file(
    _auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    if !config_service::is_output_upload_allowed(pool.get_ref()).await {
        return Err(AppError::Unauthorized(
            "Uploading test output files is not allowed".to_string(),
        ));
    }

    let run_id = path.into_inner();
    // Uploads are allowed into private runs; only existence matters here
    let run = run_service::get_run(pool.get_ref(), run_id, true).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::InvalidInput(format!("Invalid multipart payload: {}", e)))?;

        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Missing filename".to_string()))?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::InvalidInput(format!("Invalid multipart payload: {}", e)))?;
            if data.len() + chunk.len() > config.max_file_size {
                return Err(AppError::InvalidInput("File size exceeds limit".to_string()));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

    let stored =
        storage::save_output_file(pool.get_ref(), config.get_ref(), run.id, &filename, &data)
            .await?;

    Ok(HttpResponse::Created().json(OutputFileResponse::from(stored)))
}

/// Configure file routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_files)
        .service(download_file)
        .service(upload_file);
}
