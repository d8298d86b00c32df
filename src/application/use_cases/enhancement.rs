// ============================================================
// ENHANCEMENT
// ============================================================
// Optional AI enrichment of a preview's descriptive fields. Failures are
// logged and swallowed; the original preview always survives untouched.

use crate::application::use_cases::import_validation::ImportValidationUseCase;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::preview::CourseImportPreview;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::clean_llm_response;

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are a curriculum designer. Given a course module, suggest missing descriptive fields. Respond with ONLY a JSON object with optional keys: description (string), subtopics (string array), tasks (string array), duration (string), difficulty (one of Beginner, Intermediate, Advanced). Do not include any explanations.";

/// The subset of fields the model is allowed to fill in. Anything else in the
/// response is ignored.
#[derive(Debug, Deserialize)]
struct Enrichment {
    description: Option<String>,
    subtopics: Option<Vec<String>>,
    tasks: Option<Vec<String>>,
    duration: Option<String>,
    difficulty: Option<String>,
}

pub struct EnhancementUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl EnhancementUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Enrich absent optional fields on one preview. On any failure the
    /// original preview is returned unchanged; enhancement never affects
    /// validity of other records and is independently retryable.
    pub async fn enhance(
        &self,
        config: &LLMConfig,
        preview: &CourseImportPreview,
    ) -> CourseImportPreview {
        match self.request_enrichment(config, preview).await {
            Ok(enrichment) => {
                let mut enriched = preview.clone();
                apply_enrichment(&mut enriched, enrichment);
                ImportValidationUseCase::apply(&mut enriched);
                enriched
            }
            Err(e) => {
                warn!(topic = %preview.topic, error = %e, "enhancement failed, keeping original");
                preview.clone()
            }
        }
    }

    async fn request_enrichment(
        &self,
        config: &LLMConfig,
        preview: &CourseImportPreview,
    ) -> Result<Enrichment> {
        let user_prompt = build_user_prompt(preview);
        let raw = self
            .llm_client
            .generate(config, SYSTEM_PROMPT, &user_prompt)
            .await?;
        let cleaned = clean_llm_response(&raw);
        let enrichment: Enrichment = serde_json::from_str(&cleaned)
            .map_err(|e| crate::domain::error::AppError::EnhancementError(format!(
                "Unparseable enrichment response: {}",
                e
            )))?;
        Ok(enrichment)
    }
}

fn build_user_prompt(preview: &CourseImportPreview) -> String {
    let mut lines = vec![format!("Topic: {}", preview.topic)];
    if let Some(description) = &preview.description {
        lines.push(format!("Description: {}", description));
    }
    if !preview.subtopics.is_empty() {
        lines.push(format!("Subtopics: {}", preview.subtopics.join(", ")));
    }
    if !preview.tasks.is_empty() {
        lines.push(format!("Tasks: {}", preview.tasks.join(", ")));
    }
    if !preview.youtube_links.is_empty() {
        lines.push(format!("Video links: {}", preview.youtube_links.len()));
    }
    lines.push("Suggest values ONLY for the fields that are missing above.".to_string());
    lines.join("\n")
}

/// Model output only fills gaps. Fields the user already has are kept.
fn apply_enrichment(preview: &mut CourseImportPreview, enrichment: Enrichment) {
    if preview.description.as_deref().map(str::trim).unwrap_or("").is_empty() {
        if let Some(description) = non_empty(enrichment.description) {
            preview.description = Some(description);
        }
    }
    if preview.subtopics.is_empty() {
        if let Some(subtopics) = enrichment.subtopics {
            preview.subtopics = clean_list(subtopics);
        }
    }
    if preview.tasks.is_empty() {
        if let Some(tasks) = enrichment.tasks {
            preview.tasks = clean_list(tasks);
        }
    }
    if preview.duration.as_deref().map(str::trim).unwrap_or("").is_empty() {
        if let Some(duration) = non_empty(enrichment.duration) {
            preview.duration = Some(duration);
        }
    }
    if preview.difficulty.as_deref().map(str::trim).unwrap_or("").is_empty() {
        if let Some(difficulty) = non_empty(enrichment.difficulty) {
            preview.difficulty = Some(difficulty);
        }
    }
    preview.dedup_arrays();
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use async_trait::async_trait;

    struct FixedClient {
        response: std::result::Result<String, String>,
    }

    #[async_trait]
    impl LLMClient for FixedClient {
        async fn generate(&self, _: &LLMConfig, _: &str, _: &str) -> Result<String> {
            self.response
                .clone()
                .map_err(AppError::LLMError)
        }
    }

    fn preview() -> CourseImportPreview {
        let mut preview = CourseImportPreview {
            topic: "Networking".to_string(),
            youtube_links: vec!["https://youtu.be/abc12345".to_string()],
            tasks: vec!["Build a subnet calculator".to_string()],
            ..Default::default()
        };
        ImportValidationUseCase::apply(&mut preview);
        preview
    }

    #[tokio::test]
    async fn test_enrichment_fills_only_missing_fields() {
        let client = FixedClient {
            response: Ok(r#"{"description": "Learn TCP/IP", "tasks": ["ignored"], "duration": "1 week"}"#.to_string()),
        };
        let use_case = EnhancementUseCase::new(Arc::new(client));
        let enriched = use_case.enhance(&LLMConfig::default(), &preview()).await;

        assert_eq!(enriched.description.as_deref(), Some("Learn TCP/IP"));
        assert_eq!(enriched.duration.as_deref(), Some("1 week"));
        // The user's existing task list wins over the suggestion.
        assert_eq!(enriched.tasks, vec!["Build a subnet calculator".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_returns_original_unchanged() {
        let client = FixedClient {
            response: Err("connection refused".to_string()),
        };
        let use_case = EnhancementUseCase::new(Arc::new(client));
        let original = preview();
        let enriched = use_case.enhance(&LLMConfig::default(), &original).await;

        assert_eq!(enriched.topic, original.topic);
        assert_eq!(enriched.description, original.description);
        assert!(enriched.is_valid());
    }

    #[tokio::test]
    async fn test_unparseable_response_returns_original() {
        let client = FixedClient {
            response: Ok("I think this course is great!".to_string()),
        };
        let use_case = EnhancementUseCase::new(Arc::new(client));
        let enriched = use_case.enhance(&LLMConfig::default(), &preview()).await;
        assert!(enriched.description.is_none());
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let client = FixedClient {
            response: Ok("```json\n{\"difficulty\": \"Intermediate\"}\n```".to_string()),
        };
        let use_case = EnhancementUseCase::new(Arc::new(client));
        let enriched = use_case.enhance(&LLMConfig::default(), &preview()).await;
        assert_eq!(enriched.difficulty.as_deref(), Some("Intermediate"));
    }
}
