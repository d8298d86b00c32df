use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Server and collaborator endpoints. Values come from defaults, then an
/// optional `coursebridge.toml`, then `COURSEBRIDGE_*` environment variables,
/// later sources winning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub course_api_url: String,
    pub upload_api_url: Option<String>,
    pub llm: LLMConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            course_api_url: "http://localhost:3000/api/courses".to_string(),
            upload_api_url: None,
            llm: LLMConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("coursebridge.toml"))
            .merge(Env::prefixed("COURSEBRIDGE_").split("__"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Invalid configuration: {}", e)))
    }
}
