use crate::domain::error::{AppError, Result};
use crate::domain::preview::UploadedDocument;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// Bulk document upload collaborator. Files are uploaded with their
/// associated topic so the returned records can be matched back to previews
/// by topic-name equality.
pub struct DocumentUploadClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl DocumentUploadClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn upload(
        &self,
        topic: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedDocument> {
        let size = bytes.len() as u64;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("topic", topic.to_string())
            .part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Upload API error ({}): {}",
                status, text
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse upload response: {}", e)))?;

        let document = UploadedDocument {
            id: parsed.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: file_name.to_string(),
            doc_type: content_type.to_string(),
            size,
            url: parsed.url.unwrap_or_default(),
            uploaded_at: Utc::now().to_rfc3339(),
            sha256: Some(sha256),
        };
        info!(topic = %topic, name = %file_name, size, "document uploaded");
        Ok(document)
    }
}
