// ============================================================
// IMPORT VALIDATION
// ============================================================
// Pure diagnostics over a single preview plus the stateless summary over a
// preview set. Nothing here mutates a record except `apply`, which only
// writes the joined blocking error back.

use crate::application::use_cases::link_extractor::LinkExtractor;
use crate::domain::preview::{CourseImportPreview, ImportSummary, ImportValidationResult};

use serde_json::{json, Value};

const MIN_TOPIC_LENGTH: usize = 3;
const ERROR_SEPARATOR: &str = "; ";

/// Result of validating one preview. Errors block commit, notifications are
/// suggestions only, `info` is the static field-policy block for UI display.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub errors: Vec<String>,
    pub notifications: Vec<String>,
    pub info: Value,
}

impl Diagnostics {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn joined_error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join(ERROR_SEPARATOR))
        }
    }
}

pub struct ImportValidationUseCase;

impl ImportValidationUseCase {
    /// Pure function of the preview's current field values. Calling it twice
    /// without mutation returns identical output.
    pub fn diagnostics(preview: &CourseImportPreview) -> Diagnostics {
        let mut errors = Vec::new();
        let mut notifications = Vec::new();

        let topic = preview.topic.trim();
        if topic.is_empty() {
            errors.push("Topic is required".to_string());
        } else if topic.chars().count() < MIN_TOPIC_LENGTH {
            errors.push(format!(
                "Topic '{}' is too short (minimum {} characters)",
                topic, MIN_TOPIC_LENGTH
            ));
        }

        let (valid_links, invalid_links) = partition_links(preview);
        let has_content = valid_links > 0 || !preview.uploaded_documents.is_empty();
        if !has_content {
            errors.push(
                "Content links are mandatory: add at least one video, PDF, or document link, or upload a document"
                    .to_string(),
            );
        }

        // An invalid subset never blocks by itself; only zero valid content
        // of every kind does (handled above).
        if !invalid_links.is_empty() {
            let named: Vec<&str> = invalid_links.iter().take(2).map(|s| s.as_str()).collect();
            let suffix = if invalid_links.len() > named.len() {
                format!(" and {} more", invalid_links.len() - named.len())
            } else {
                String::new()
            };
            notifications.push(format!(
                "{} link(s) do not look like URLs and will be ignored: {}{}",
                invalid_links.len(),
                named.join(", "),
                suffix
            ));
        }

        if preview.subtopics.is_empty() {
            notifications.push("Consider adding subtopics to structure the module".to_string());
        }
        if preview.tasks.is_empty() {
            notifications.push("Consider adding a practice task".to_string());
        }
        if preview.description.as_deref().map(str::trim).unwrap_or("").is_empty() {
            notifications.push("Consider adding a description".to_string());
        }
        if preview.duration.as_deref().map(str::trim).unwrap_or("").is_empty() {
            notifications.push("Consider adding an estimated duration".to_string());
        }

        Diagnostics {
            errors,
            notifications,
            info: validation_info(),
        }
    }

    /// Re-run diagnostics and write the joined blocking error back onto the
    /// preview. Called after every field edit.
    pub fn apply(preview: &mut CourseImportPreview) -> Diagnostics {
        let diagnostics = Self::diagnostics(preview);
        preview.error = diagnostics.joined_error();
        diagnostics
    }

    /// Stateless partition of the current preview set. Always recomputed in
    /// full so displayed counts cannot drift from record state.
    pub fn summarize(previews: &[CourseImportPreview]) -> ImportValidationResult {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        let mut errors = Vec::new();

        for preview in previews {
            match &preview.error {
                None => valid.push(preview.clone()),
                Some(error) => {
                    errors.push(format!("{}: {}", display_topic(preview), error));
                    invalid.push(preview.clone());
                }
            }
        }

        let summary = ImportSummary {
            total: previews.len(),
            valid_count: valid.len(),
            invalid_count: invalid.len(),
            errors,
        };

        ImportValidationResult { valid, invalid, summary }
    }
}

fn display_topic(preview: &CourseImportPreview) -> &str {
    let topic = preview.topic.trim();
    if topic.is_empty() {
        "(untitled)"
    } else {
        topic
    }
}

/// Count syntactically valid links across all three categories and collect
/// the malformed ones for reporting.
fn partition_links(preview: &CourseImportPreview) -> (usize, Vec<String>) {
    let mut valid = 0;
    let mut invalid = Vec::new();

    for link in preview
        .youtube_links
        .iter()
        .chain(preview.pdf_links.iter())
        .chain(preview.doc_links.iter())
    {
        if LinkExtractor::is_link_shaped(link.trim()) {
            valid += 1;
        } else {
            invalid.push(link.trim().to_string());
        }
    }

    (valid, invalid)
}

/// Static field-policy block shown next to the preview table.
pub fn validation_info() -> Value {
    json!({
        "requiredFields": ["topic", "at least one content link or uploaded document"],
        "optionalFields": ["week", "subtopics", "tasks", "description", "duration", "difficulty"],
        "note": "Video and document content are alternatives; a record needs one or the other, not both."
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preview::UploadedDocument;

    fn preview_with(topic: &str, video: Option<&str>) -> CourseImportPreview {
        CourseImportPreview {
            topic: topic.to_string(),
            youtube_links: video.map(|v| vec![v.to_string()]).unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let preview = preview_with("Networking", Some("https://youtu.be/abc12345"));
        let diagnostics = ImportValidationUseCase::diagnostics(&preview);
        assert!(diagnostics.is_valid());
        assert!(diagnostics.joined_error().is_none());
    }

    #[test]
    fn test_short_topic_is_blocking_even_with_content() {
        let preview = preview_with("AB", Some("https://youtu.be/abc12345"));
        let diagnostics = ImportValidationUseCase::diagnostics(&preview);
        assert_eq!(diagnostics.errors.len(), 1);
        assert!(diagnostics.errors[0].contains("too short"));
    }

    #[test]
    fn test_missing_content_is_blocking() {
        let preview = preview_with("Networking", None);
        let diagnostics = ImportValidationUseCase::diagnostics(&preview);
        assert_eq!(diagnostics.errors.len(), 1);
        assert!(diagnostics.errors[0].contains("Content links are mandatory"));
    }

    #[test]
    fn test_uploaded_document_satisfies_content_rule() {
        let mut preview = preview_with("Networking", None);
        preview.uploaded_documents.push(UploadedDocument {
            id: "doc-1".to_string(),
            name: "notes.pdf".to_string(),
            doc_type: "application/pdf".to_string(),
            size: 1024,
            url: "https://files.example.com/notes.pdf".to_string(),
            uploaded_at: "2026-08-29T00:00:00Z".to_string(),
            sha256: None,
        });
        let diagnostics = ImportValidationUseCase::diagnostics(&preview);
        assert!(diagnostics.is_valid());
    }

    #[test]
    fn test_invalid_subset_notifies_but_does_not_block() {
        let mut preview = preview_with("Networking", Some("https://youtu.be/abc12345"));
        preview.pdf_links.push("not-a-url".to_string());
        preview.doc_links.push("also bad".to_string());
        let diagnostics = ImportValidationUseCase::diagnostics(&preview);
        assert!(diagnostics.is_valid());
        let note = diagnostics
            .notifications
            .iter()
            .find(|n| n.contains("do not look like URLs"))
            .unwrap();
        assert!(note.contains("not-a-url"));
        assert!(note.contains("also bad"));
    }

    #[test]
    fn test_diagnostics_is_pure() {
        let preview = preview_with("AB", None);
        let first = ImportValidationUseCase::diagnostics(&preview);
        let second = ImportValidationUseCase::diagnostics(&preview);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.notifications, second.notifications);
        assert_eq!(first.info, second.info);
    }

    #[test]
    fn test_apply_sets_and_clears_error() {
        let mut preview = preview_with("Networking", None);
        ImportValidationUseCase::apply(&mut preview);
        assert!(preview.error.is_some());

        preview.youtube_links.push("https://youtu.be/abc12345".to_string());
        ImportValidationUseCase::apply(&mut preview);
        assert!(preview.error.is_none());
    }

    #[test]
    fn test_summary_partitions_and_counts() {
        let mut valid = preview_with("Networking", Some("https://youtu.be/abc12345"));
        ImportValidationUseCase::apply(&mut valid);
        let mut invalid = preview_with("Databases", None);
        ImportValidationUseCase::apply(&mut invalid);

        let result = ImportValidationUseCase::summarize(&[valid, invalid]);
        assert_eq!(result.summary.total, 2);
        assert_eq!(result.summary.valid_count, 1);
        assert_eq!(result.summary.invalid_count, 1);
        assert_eq!(result.summary.errors.len(), 1);
        assert!(result.summary.errors[0].starts_with("Databases:"));
    }

    #[test]
    fn test_empty_set_yields_zero_summary() {
        let result = ImportValidationUseCase::summarize(&[]);
        assert_eq!(result.summary.total, 0);
        assert_eq!(result.summary.valid_count, 0);
        assert_eq!(result.summary.invalid_count, 0);
        assert!(result.summary.errors.is_empty());
    }
}
