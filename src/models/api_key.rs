//! API key domain types.
//!
//! The raw bearer token appears exactly once, in `ApiKeyCreateResponse`;
//! every other surface exposes only the public key id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::api_key;

/// Response when creating a new API key (includes the full token).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyCreateResponse {
    pub id: Uuid,
    /// Full bearer token - only shown once
    pub key: String,
    pub key_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response for listing API keys (secret hash never included).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyListItem {
    pub id: Uuid,
    pub key_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<api_key::Model> for ApiKeyListItem {
    fn from(m: api_key::Model) -> Self {
        Self {
            id: m.id,
            key_id: m.key_id,
            name: m.name,
            project_id: m.project_id,
            expires_at: m.expires_at,
            last_used_at: m.last_used_at,
            created_at: m.created_at,
        }
    }
}

/// Request to create a new API key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    /// Expiration duration (e.g., "365d", "30d", "1y")
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Caller identity established by a verified API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// Record id of the matched key; `None` for the bootstrap admin key.
    pub key_id: Option<Uuid>,
    pub name: String,
    pub project_id: Option<Uuid>,
}
