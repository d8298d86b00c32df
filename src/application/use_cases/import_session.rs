// ============================================================
// IMPORT SESSION
// ============================================================
// Orchestrates one import submission end to end: ingest files in submission
// order, normalize and validate every record, let the caller edit previews,
// then commit the valid ones in a single all-or-nothing request.

use crate::application::use_cases::course_materializer::{CommitMode, CourseMaterializerUseCase};
use crate::application::use_cases::field_normalizer::FieldNormalizer;
use crate::application::use_cases::import_ingestion::ImportIngestionUseCase;
use crate::application::use_cases::import_validation::ImportValidationUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::preview::{CourseImportPreview, ImportValidationResult, UploadedDocument};
use crate::infrastructure::course_api::{CourseCommitResponse, CourseStore};

use serde::Serialize;
use tracing::{info, warn};

/// One input file of a batch submission.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Per-file ingestion outcome. A failed file never aborts the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file_name: String,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Default)]
pub struct ImportSession {
    ingestion: ImportIngestionUseCase,
    previews: Vec<CourseImportPreview>,
    outcomes: Vec<FileOutcome>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a session from previews edited on the client side. Every
    /// preview is revalidated; client-supplied `error` fields are never
    /// trusted.
    pub fn from_previews(previews: Vec<CourseImportPreview>) -> Self {
        let mut session = Self::new();
        for mut preview in previews {
            preview.dedup_arrays();
            ImportValidationUseCase::apply(&mut preview);
            session.previews.push(preview);
        }
        session
    }

    /// Ingest a batch of files. Preview ordering equals strict submission
    /// order across files and source order within each file.
    pub fn ingest_files(&mut self, files: &[ImportFile]) {
        for file in files {
            match self.ingestion.parse_source(&file.file_name, &file.content) {
                Ok(records) => {
                    let mut count = 0;
                    for record in &records {
                        let mut preview = FieldNormalizer::normalize(record);
                        ImportValidationUseCase::apply(&mut preview);
                        self.previews.push(preview);
                        count += 1;
                    }
                    self.outcomes.push(FileOutcome {
                        file_name: file.file_name.clone(),
                        record_count: count,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "file import failed");
                    self.outcomes.push(FileOutcome {
                        file_name: file.file_name.clone(),
                        record_count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
    }

    /// Ingest pasted free text, routed by content sniffing.
    pub fn ingest_text(&mut self, text: &str) -> Result<usize> {
        let records = self.ingestion.parse_pasted_text(text)?;
        let count = records.len();
        for record in &records {
            let mut preview = FieldNormalizer::normalize(record);
            ImportValidationUseCase::apply(&mut preview);
            self.previews.push(preview);
        }
        Ok(count)
    }

    pub fn previews(&self) -> &[CourseImportPreview] {
        &self.previews
    }

    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Replace one preview with its edited version and revalidate it.
    /// Validation is never cached across edits.
    pub fn update_preview(&mut self, index: usize, mut updated: CourseImportPreview) -> Result<()> {
        let slot = self
            .previews
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("No preview at index {}", index)))?;
        updated.dedup_arrays();
        ImportValidationUseCase::apply(&mut updated);
        *slot = updated;
        Ok(())
    }

    /// Attach an uploaded document to every preview whose topic equals the
    /// document's associated topic, then revalidate those previews.
    pub fn attach_document(&mut self, topic: &str, document: UploadedDocument) -> usize {
        let mut matched = 0;
        for preview in &mut self.previews {
            if preview.topic.trim() == topic.trim() {
                preview.uploaded_documents.push(document.clone());
                ImportValidationUseCase::apply(preview);
                matched += 1;
            }
        }
        matched
    }

    /// Stateless partition of the current preview set.
    pub fn validation(&self) -> ImportValidationResult {
        ImportValidationUseCase::summarize(&self.previews)
    }

    /// Materialize the valid previews and submit them in one request. The
    /// store contract makes the commit all-or-nothing; nothing is retried or
    /// partially applied here.
    pub async fn commit(
        &self,
        mode: CommitMode,
        course_name: Option<&str>,
        store: &dyn CourseStore,
    ) -> Result<CourseCommitResponse> {
        let courses = CourseMaterializerUseCase::materialize(mode, course_name, &self.previews);
        if courses.is_empty() {
            return Err(AppError::MaterializationError(
                "No valid records to commit".to_string(),
            ));
        }
        info!(courses = courses.len(), "submitting import");
        store.create_courses(&courses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingStore {
        submitted: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl CourseStore for RecordingStore {
        async fn create_courses(
            &self,
            courses: &[crate::domain::course::Course],
        ) -> Result<CourseCommitResponse> {
            self.submitted.lock().unwrap().push(courses.len());
            Ok(CourseCommitResponse {
                success: true,
                created_count: courses.len(),
                failed_count: 0,
                course_ids: courses.iter().map(|_| "id".to_string()).collect(),
            })
        }
    }

    fn file(name: &str, content: &str) -> ImportFile {
        ImportFile {
            file_name: name.to_string(),
            content: content.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_nested_syllabus_scenario() {
        let mut session = ImportSession::new();
        session.ingest_files(&[file(
            "syllabus.yaml",
            "\
Networking Course:
  - topic: Subnetting
    resource link: https://youtu.be/abc12345
  - topic: Routing
",
        )]);

        let previews = session.previews();
        assert_eq!(previews.len(), 2);
        assert!(previews[0].is_valid());
        assert!(!previews[1].is_valid());
        assert!(previews[1]
            .error
            .as_deref()
            .unwrap()
            .contains("Content links are mandatory"));
    }

    #[test]
    fn test_structured_text_scenario() {
        let mut session = ImportSession::new();
        let count = session
            .ingest_text(
                "Topic: Networking\nYouTube: https://youtu.be/abc12345\nPractice: Build a subnet calculator\n",
            )
            .unwrap();
        assert_eq!(count, 1);

        let preview = &session.previews()[0];
        assert_eq!(preview.topic, "Networking");
        assert_eq!(preview.youtube_links.len(), 1);
        assert_eq!(preview.tasks, vec!["Build a subnet calculator".to_string()]);
        assert!(preview.is_valid());
    }

    #[test]
    fn test_empty_file_yields_zero_summary() {
        let mut session = ImportSession::new();
        session.ingest_files(&[file("empty.json", "[]")]);
        let result = session.validation();
        assert_eq!(result.summary.total, 0);
        assert_eq!(result.summary.valid_count, 0);
        assert_eq!(result.summary.invalid_count, 0);
    }

    #[test]
    fn test_failed_file_does_not_abort_batch() {
        let mut session = ImportSession::new();
        session.ingest_files(&[
            file("bad.json", "{not json"),
            file("good.json", r#"{"topic": "Git", "link": "https://youtu.be/abc12345"}"#),
        ]);

        assert_eq!(session.previews().len(), 1);
        let outcomes = session.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].error.as_deref().unwrap().contains("Parse error"));
        assert!(outcomes[1].error.is_none());
    }

    #[test]
    fn test_attach_document_revalidates_matching_topic() {
        let mut session = ImportSession::new();
        session.ingest_files(&[file("notes.json", r#"{"topic": "Linear Algebra"}"#)]);
        assert!(!session.previews()[0].is_valid());

        let matched = session.attach_document(
            "Linear Algebra",
            UploadedDocument {
                id: "doc-1".to_string(),
                name: "notes.pdf".to_string(),
                doc_type: "application/pdf".to_string(),
                size: 10,
                url: "https://files.example.com/notes.pdf".to_string(),
                uploaded_at: "2026-08-29T00:00:00Z".to_string(),
                sha256: None,
            },
        );
        assert_eq!(matched, 1);
        assert!(session.previews()[0].is_valid());
    }

    #[test]
    fn test_from_previews_revalidates_client_edits() {
        // A client-supplied preview claiming validity is re-checked.
        let claimed_valid = CourseImportPreview {
            topic: "Networking".to_string(),
            error: None,
            ..Default::default()
        };
        // And a stale error on a now-complete preview is cleared.
        let claimed_invalid = CourseImportPreview {
            topic: "Databases".to_string(),
            youtube_links: vec![
                "https://youtu.be/abc12345".to_string(),
                "https://youtu.be/abc12345".to_string(),
            ],
            error: Some("Content links are mandatory".to_string()),
            ..Default::default()
        };

        let session = ImportSession::from_previews(vec![claimed_valid, claimed_invalid]);
        assert!(!session.previews()[0].is_valid());
        assert!(session.previews()[1].is_valid());
        assert_eq!(session.previews()[1].youtube_links.len(), 1);
    }

    #[test]
    fn test_update_preview_revalidates() {
        let mut session = ImportSession::new();
        session.ingest_files(&[file("one.json", r#"{"topic": "Git"}"#)]);
        let mut edited = session.previews()[0].clone();
        edited.youtube_links.push("https://youtu.be/abc12345".to_string());
        session.update_preview(0, edited).unwrap();
        assert!(session.previews()[0].is_valid());

        let err = session
            .update_preview(9, CourseImportPreview::default())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_commit_submits_only_valid_previews() {
        let mut session = ImportSession::new();
        session.ingest_files(&[
            file("a.json", r#"{"topic": "Git", "link": "https://youtu.be/abc12345"}"#),
            file("b.json", r#"{"topic": "No Content Here"}"#),
        ]);

        let store = RecordingStore {
            submitted: Mutex::new(Vec::new()),
        };
        let response = session
            .commit(CommitMode::MultiCourse, None, &store)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.created_count, 1);
        assert_eq!(*store.submitted.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_commit_with_nothing_valid_is_an_error() {
        let session = ImportSession::new();
        let store = RecordingStore {
            submitted: Mutex::new(Vec::new()),
        };
        let err = session
            .commit(CommitMode::SingleCourse, Some("Empty"), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MaterializationError(_)));
        assert!(store.submitted.lock().unwrap().is_empty());
    }
}
