pub mod openai;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use openai::OpenAIClient;

/// Chat-completion client used by the enhancement step. Local servers,
/// OpenAI, and Google-compatible gateways all speak the same wire shape here.
#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
}

pub fn default_client() -> OpenAIClient {
    OpenAIClient::new()
}
