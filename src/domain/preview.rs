use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document uploaded through the bulk upload collaborator and matched back
/// to a preview by topic name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// The canonical, editable unit representing one prospective course module.
///
/// `error` is set if and only if the record currently fails validation; link
/// arrays never hold duplicate URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseImportPreview {
    pub topic: String,
    #[serde(default)]
    pub youtube_links: Vec<String>,
    #[serde(default)]
    pub pdf_links: Vec<String>,
    #[serde(default)]
    pub doc_links: Vec<String>,
    #[serde(default)]
    pub uploaded_documents: Vec<UploadedDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CourseImportPreview {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Drop duplicate entries from every array field, keeping first
    /// occurrences in place.
    pub fn dedup_arrays(&mut self) {
        dedup_in_place(&mut self.youtube_links);
        dedup_in_place(&mut self.pdf_links);
        dedup_in_place(&mut self.doc_links);
        dedup_in_place(&mut self.subtopics);
        dedup_in_place(&mut self.tasks);
    }
}

pub fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub errors: Vec<String>,
}

/// Stateless partition of the current preview set. Always recomputed from the
/// records, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportValidationResult {
    pub valid: Vec<CourseImportPreview>,
    pub invalid: Vec<CourseImportPreview>,
    pub summary: ImportSummary,
}
