//! Actix-web extractors for API key and admin session authentication.
//!
//! # Security
//! - Secret header values are wrapped in `SecretString` on extraction and
//!   zeroized when the request completes
//! - The bootstrap admin key is compared in constant time
//! - Verification failures are uniform regardless of which check failed

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};

use super::AdminKey;
use crate::config::{Config, ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::db::DbPool;
use crate::error::ErrorResponse;
use crate::models::{AdminPrincipal, AuthenticatedClient};
use crate::services::{api_key, session};

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Extract a bearer token from the Authorization header.
fn extract_bearer_token(req: &HttpRequest) -> Option<SecretString> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| SecretString::from(s.to_string()))
}

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

fn internal_auth_error() -> AuthError {
    AuthError {
        message: "Internal configuration error".to_string(),
    }
}

/// Extractor that requires a valid API key (or the bootstrap admin key).
///
/// Use this in handlers that gate ingestion:
/// ```ignore
/// async fn protected_handler(auth: ApiKeyAuth) -> impl Responder {
///     // auth.client contains the authenticated client info
/// }
/// ```
pub struct ApiKeyAuth {
    pub client: AuthenticatedClient,
}

impl FromRequest for ApiKeyAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let pool = req
                .app_data::<web::Data<DbPool>>()
                .cloned()
                .ok_or_else(internal_auth_error)?;
            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(internal_auth_error)?;
            let stored_admin_key = req.app_data::<web::Data<AdminKey>>().cloned();

            // Bootstrap admin key first, for key management before any
            // database key exists. Constant-time comparison.
            if let Some(provided) = extract_secret_header(&req, ADMIN_KEY_HEADER)
                && let Some(stored) = stored_admin_key
                && stored.verify(provided.expose_secret())
            {
                return Ok(ApiKeyAuth {
                    client: AuthenticatedClient {
                        key_id: None,
                        name: "Admin (Bootstrap)".to_string(),
                        project_id: None,
                    },
                });
            }

            // X-API-Key header, or Authorization: Bearer for CI clients
            let token = extract_secret_header(&req, API_KEY_HEADER)
                .or_else(|| extract_bearer_token(&req));

            match token {
                Some(ref token) => {
                    api_key::verify_key(&pool, &config.api_key_salt, token.expose_secret())
                        .await
                        .map(|client| ApiKeyAuth { client })
                        .map_err(|e| AuthError {
                            message: e.to_string(),
                        })
                }
                None => Err(AuthError {
                    message: format!(
                        "Missing API key. Provide the {} header or a bearer token.",
                        API_KEY_HEADER
                    ),
                }),
            }
        })
    }
}

/// Extractor that requires a valid admin session token.
pub struct AdminAuth {
    pub principal: AdminPrincipal,
}

impl FromRequest for AdminAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(internal_auth_error)?;

            let token = extract_bearer_token(&req).ok_or_else(|| AuthError {
                message: "Missing Authorization header".to_string(),
            })?;

            session::verify_token(&config.jwt_secret, token.expose_secret())
                .map(|principal| AdminAuth { principal })
                .map_err(|e| AuthError {
                    message: e.to_string(),
                })
        })
    }
}
