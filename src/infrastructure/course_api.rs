use crate::domain::course::Course;
use crate::domain::error::{AppError, Result};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Commit request submitted to the external course-creation endpoint.
#[derive(Debug, Serialize)]
pub struct CourseCommitRequest<'a> {
    pub courses: &'a [Course],
}

/// The only part of the endpoint's response contract we consume.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCommitResponse {
    pub success: bool,
    #[serde(default)]
    pub created_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(default)]
    pub course_ids: Vec<String>,
}

/// Persistence collaborator. Commits are all-or-nothing per submission; a
/// partially applied batch is treated as a failure.
#[async_trait]
pub trait CourseStore {
    async fn create_courses(&self, courses: &[Course]) -> Result<CourseCommitResponse>;
}

pub struct HttpCourseStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCourseStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CourseStore for HttpCourseStore {
    async fn create_courses(&self, courses: &[Course]) -> Result<CourseCommitResponse> {
        if courses.is_empty() {
            return Err(AppError::MaterializationError(
                "No valid courses to commit".to_string(),
            ));
        }

        let body = CourseCommitRequest { courses };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::MaterializationError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::MaterializationError(format!(
                "Course API error ({}): {}",
                status, text
            )));
        }

        let parsed: CourseCommitResponse = response
            .json()
            .await
            .map_err(|e| AppError::MaterializationError(format!("Failed to parse response: {}", e)))?;

        if !parsed.success || parsed.failed_count > 0 {
            return Err(AppError::MaterializationError(format!(
                "Commit rejected: {} created, {} failed",
                parsed.created_count, parsed.failed_count
            )));
        }

        info!(created = parsed.created_count, "courses committed");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_request_serializes_courses_key() {
        let request = CourseCommitRequest { courses: &[] };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("courses").is_some());
    }

    #[test]
    fn test_response_defaults_for_missing_fields() {
        let parsed: CourseCommitResponse =
            serde_json::from_str(r#"{"success": true, "createdCount": 2}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.created_count, 2);
        assert_eq!(parsed.failed_count, 0);
        assert!(parsed.course_ids.is_empty());
    }
}
