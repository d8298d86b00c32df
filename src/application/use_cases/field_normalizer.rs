// ============================================================
// FIELD NORMALIZER
// ============================================================
// Map the many historical field-name spellings of a raw record onto the
// canonical preview schema, merging extracted links along the way.

use crate::application::use_cases::link_extractor::{LinkExtractor, LinkKind};
use crate::domain::preview::CourseImportPreview;
use crate::domain::raw_record::{RawRecord, RawValue};

use std::collections::HashSet;

const TOPIC_ALIASES: &[&str] = &[
    "topic",
    "title",
    "name",
    "course",
    "course_name",
    "module",
    "module_name",
    "subject",
    "lesson",
    "chapter",
    "heading",
    "week_topic",
];

const VIDEO_LINK_ALIASES: &[&str] = &[
    "youtube_links",
    "youtube",
    "youtube_link",
    "youtube_url",
    "youtube_urls",
    "video",
    "videos",
    "video_link",
    "video_links",
    "video_url",
    "video_urls",
    "links",
    "urls",
    "resource_link",
    "resource_links",
    "resources",
];

const PDF_LINK_ALIASES: &[&str] = &["pdf_links", "pdf", "pdfs", "pdf_link", "pdf_url", "pdf_urls"];

const DOC_LINK_ALIASES: &[&str] = &[
    "doc_links",
    "doc",
    "docs",
    "documents",
    "document_links",
    "materials",
    "files",
    "reading",
    "readings",
];

const OTHER_LINK_ALIASES: &[&str] = &["other_links"];

const SUBTOPIC_ALIASES: &[&str] =
    &["subtopics", "sub_topics", "topics", "covers", "contents", "outline", "points"];

const TASK_ALIASES: &[&str] = &[
    "tasks",
    "task",
    "assignments",
    "assignment",
    "exercises",
    "exercise",
    "practice",
    "practice_task",
    "projects",
    "project",
    "homework",
];

const DESCRIPTION_ALIASES: &[&str] =
    &["description", "desc", "summary", "details", "overview", "about"];

const WEEK_ALIASES: &[&str] = &["week", "week_number", "week_no"];

const DURATION_ALIASES: &[&str] = &["duration", "time", "length", "estimated_time", "hours"];

const DIFFICULTY_ALIASES: &[&str] = &["difficulty", "level", "difficulty_level"];

pub struct FieldNormalizer;

impl FieldNormalizer {
    /// Total, pure mapping from one raw record to the canonical preview.
    /// Validation is a separate step; the returned preview carries no error.
    pub fn normalize(record: &RawRecord) -> CourseImportPreview {
        let mut used: HashSet<String> = HashSet::new();
        let mut preview = CourseImportPreview::default();

        preview.topic = Self::resolve_topic(record, &mut used);

        // (i) Values already present under recognized link-field aliases,
        // kept only when link-shaped, re-routed by classifier so a video URL
        // stored under a generic "links" field still lands in youtubeLinks.
        Self::collect_alias_links(record, VIDEO_LINK_ALIASES, LinkKind::Video, &mut preview, &mut used);
        Self::collect_alias_links(record, PDF_LINK_ALIASES, LinkKind::Pdf, &mut preview, &mut used);
        Self::collect_alias_links(record, DOC_LINK_ALIASES, LinkKind::Document, &mut preview, &mut used);
        Self::collect_alias_links(record, OTHER_LINK_ALIASES, LinkKind::Other, &mut preview, &mut used);

        preview.subtopics = Self::resolve_string_list(record, SUBTOPIC_ALIASES, &mut used);
        preview.tasks = Self::resolve_string_list(record, TASK_ALIASES, &mut used);
        preview.description = Self::resolve_text(record, DESCRIPTION_ALIASES, &mut used);
        preview.duration = Self::resolve_text(record, DURATION_ALIASES, &mut used);
        preview.difficulty = Self::resolve_text(record, DIFFICULTY_ALIASES, &mut used);
        preview.week = Self::resolve_text(record, WEEK_ALIASES, &mut used)
            .and_then(|value| value.trim().parse::<u32>().ok());

        // (ii) Links recovered from fields no alias table claimed.
        let mut unrecognized_text = String::new();
        for (key, value) in record.iter() {
            if used.contains(key) {
                continue;
            }
            append_value_text(value, &mut unrecognized_text);
        }
        let recovered = LinkExtractor::extract(&unrecognized_text);
        preview.youtube_links.extend(recovered.videos);
        preview.pdf_links.extend(recovered.pdfs);
        preview.doc_links.extend(recovered.documents);

        preview.dedup_arrays();

        // Remaining original fields are preserved verbatim; canonicalized
        // names are stripped to avoid duplication in the UI.
        let mut original = serde_json::Map::new();
        for (key, value) in record.iter() {
            if used.contains(key) {
                continue;
            }
            if let serde_json::Value::Object(mut map) = single_field_json(key, value) {
                if let Some(json) = map.remove(key) {
                    original.insert(key.to_string(), json);
                }
            }
        }
        if !original.is_empty() {
            preview
                .metadata
                .insert("originalStructure".to_string(), serde_json::Value::Object(original));
        }

        preview
    }

    fn resolve_topic(record: &RawRecord, used: &mut HashSet<String>) -> String {
        for alias in TOPIC_ALIASES {
            if let Some(RawValue::Text(value)) = record.get(alias) {
                let value = value.trim();
                if !value.is_empty() {
                    used.insert(alias.to_string());
                    return value.to_string();
                }
            }
        }

        // Fall back to the first sufficiently long free string value.
        for (key, value) in record.iter() {
            if let RawValue::Text(text) = value {
                let text = text.trim();
                if text.len() >= 3 && !LinkExtractor::is_link_shaped(text) {
                    used.insert(key.to_string());
                    return text.to_string();
                }
            }
        }

        String::new()
    }

    fn collect_alias_links(
        record: &RawRecord,
        aliases: &[&str],
        default_kind: LinkKind,
        preview: &mut CourseImportPreview,
        used: &mut HashSet<String>,
    ) {
        for alias in aliases {
            let Some(value) = record.get(alias) else {
                continue;
            };
            let candidates: Vec<&str> = match value {
                RawValue::Text(s) => vec![s.as_str()],
                RawValue::List(items) => items.iter().map(|s| s.as_str()).collect(),
                RawValue::Nested(_) => continue,
            };

            let mut consumed_any = false;
            for candidate in candidates {
                let candidate = candidate.trim();
                if !LinkExtractor::is_link_shaped(candidate) {
                    continue;
                }
                consumed_any = true;
                // First-match classification decides the bucket; the alias
                // family only breaks ties for otherwise unclassifiable URLs.
                let kind = match LinkExtractor::classify(candidate) {
                    Some(LinkKind::Video) => LinkKind::Video,
                    Some(LinkKind::Pdf) => LinkKind::Pdf,
                    Some(LinkKind::Document) => LinkKind::Document,
                    _ => default_kind,
                };
                let bucket = match kind {
                    LinkKind::Video => &mut preview.youtube_links,
                    LinkKind::Pdf => &mut preview.pdf_links,
                    LinkKind::Document => &mut preview.doc_links,
                    LinkKind::Other => {
                        Self::push_other_link(preview, candidate);
                        continue;
                    }
                };
                bucket.push(candidate.to_string());
            }

            if consumed_any {
                used.insert(alias.to_string());
            }
        }
    }

    fn push_other_link(preview: &mut CourseImportPreview, link: &str) {
        let entry = preview
            .metadata
            .entry("otherLinks".to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if let serde_json::Value::Array(items) = entry {
            let value = serde_json::Value::String(link.to_string());
            if !items.contains(&value) {
                items.push(value);
            }
        }
    }

    fn resolve_string_list(
        record: &RawRecord,
        aliases: &[&str],
        used: &mut HashSet<String>,
    ) -> Vec<String> {
        for alias in aliases {
            match record.get(alias) {
                Some(RawValue::List(items)) => {
                    used.insert(alias.to_string());
                    return items
                        .iter()
                        .map(|item| item.trim().to_string())
                        .filter(|item| !item.is_empty())
                        .collect();
                }
                Some(RawValue::Text(value)) => {
                    used.insert(alias.to_string());
                    return value
                        .split(|c| c == ',' || c == ';' || c == '|')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect();
                }
                _ => {}
            }
        }
        Vec::new()
    }

    fn resolve_text(
        record: &RawRecord,
        aliases: &[&str],
        used: &mut HashSet<String>,
    ) -> Option<String> {
        for alias in aliases {
            if let Some(RawValue::Text(value)) = record.get(alias) {
                let value = value.trim();
                if !value.is_empty() {
                    used.insert(alias.to_string());
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

fn append_value_text(value: &RawValue, out: &mut String) {
    match value {
        RawValue::Text(s) => {
            out.push_str(s);
            out.push('\n');
        }
        RawValue::List(items) => {
            for item in items {
                out.push_str(item);
                out.push('\n');
            }
        }
        RawValue::Nested(entries) => {
            for (_, nested) in entries {
                append_value_text(nested, out);
            }
        }
    }
}

fn single_field_json(key: &str, value: &RawValue) -> serde_json::Value {
    let mut record = RawRecord::new();
    record.set(key, value.clone());
    record.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_resolves_from_aliases() {
        let mut record = RawRecord::new();
        record.set_text("course name", "Intro to Databases");
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(preview.topic, "Intro to Databases");
    }

    #[test]
    fn test_topic_falls_back_to_first_long_string() {
        let mut record = RawRecord::new();
        record.set_text("column_1", "Operating Systems");
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(preview.topic, "Operating Systems");
    }

    #[test]
    fn test_generic_links_field_routes_by_classifier() {
        let mut record = RawRecord::new();
        record.set_text("topic", "Mixed Resources");
        record.set_list(
            "links",
            vec![
                "https://youtu.be/abc12345".to_string(),
                "https://example.com/notes.pdf".to_string(),
                "https://docs.google.com/document/d/xyz".to_string(),
                "not a link".to_string(),
            ],
        );
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(preview.youtube_links, vec!["https://youtu.be/abc12345".to_string()]);
        assert_eq!(preview.pdf_links, vec!["https://example.com/notes.pdf".to_string()]);
        assert_eq!(
            preview.doc_links,
            vec!["https://docs.google.com/document/d/xyz".to_string()]
        );
    }

    #[test]
    fn test_links_recovered_from_unrecognized_fields() {
        let mut record = RawRecord::new();
        record.set_text("topic", "Shell Scripting");
        record.set_text("watch_later", "intro video at https://youtu.be/abc12345");
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(preview.youtube_links, vec!["https://youtu.be/abc12345".to_string()]);
    }

    #[test]
    fn test_unused_fields_preserved_in_original_structure() {
        let mut record = RawRecord::new();
        record.set_text("topic", "Graphs");
        record.set_text("week", "2");
        record.set_text("course_name", "Algorithms");
        record.set_text("custom_note", "remember this");
        let preview = FieldNormalizer::normalize(&record);

        assert_eq!(preview.week, Some(2));
        let original = preview
            .metadata
            .get("originalStructure")
            .and_then(|v| v.as_object())
            .unwrap();
        // topic/week were canonicalized and stripped; the rest survives.
        assert!(original.get("topic").is_none());
        assert!(original.get("week").is_none());
        assert_eq!(
            original.get("custom_note"),
            Some(&serde_json::Value::String("remember this".to_string()))
        );
        assert_eq!(
            original.get("course_name"),
            Some(&serde_json::Value::String("Algorithms".to_string()))
        );
    }

    #[test]
    fn test_list_like_strings_split_on_delimiters() {
        let mut record = RawRecord::new();
        record.set_text("topic", "CSS");
        record.set_text("covers", "selectors; specificity | cascade");
        record.set_text("practice", "Build a card layout");
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(
            preview.subtopics,
            vec!["selectors".to_string(), "specificity".to_string(), "cascade".to_string()]
        );
        assert_eq!(preview.tasks, vec!["Build a card layout".to_string()]);
    }

    #[test]
    fn test_duplicate_links_across_sources_are_deduped() {
        let mut record = RawRecord::new();
        record.set_text("topic", "Git");
        record.set_list("youtube_links", vec!["https://youtu.be/abc12345".to_string()]);
        record.set_text("note", "also see https://youtu.be/abc12345");
        let preview = FieldNormalizer::normalize(&record);
        assert_eq!(preview.youtube_links.len(), 1);
    }
}
