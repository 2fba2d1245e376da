//! System configuration domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::system_config;

/// A configuration entry as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemConfigItem {
    pub config_key: String,
    pub config_value: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<system_config::Model> for SystemConfigItem {
    fn from(m: system_config::Model) -> Self {
        Self {
            config_key: m.config_key,
            config_value: m.config_value,
            description: m.description,
            updated_at: m.updated_at,
        }
    }
}

/// Request to set a configuration value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSystemConfigRequest {
    pub value: String,
    #[serde(default)]
    pub description: String,
}
