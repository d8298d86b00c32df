use super::ImportIngestionUseCase;

use crate::application::use_cases::link_extractor::LinkExtractor;
use crate::domain::error::{AppError, Result};
use crate::domain::raw_record::{normalize_key, RawRecord, RawValue};

use serde_json::Value;

// Reserved top-level key carrying the course-level duration/module-count
// overview. It describes the course, not module data, and is skipped.
const OVERVIEW_KEYS: &[&str] = &["course_overview", "overview"];

const TOPIC_ALIASES: &[&str] = &["topic", "week_topic", "title", "name", "subject"];
const RESOURCE_ALIASES: &[&str] = &[
    "resource_link",
    "resource_links",
    "resource",
    "resources",
    "link",
    "links",
    "url",
    "urls",
    "video",
    "videos",
    "video_link",
    "video_links",
    "youtube",
    "youtube_links",
];
const SUBTOPIC_ALIASES: &[&str] = &["subtopics", "sub_topics", "topics", "covers", "contents"];
const TASK_ALIASES: &[&str] = &[
    "task",
    "tasks",
    "assignment",
    "assignments",
    "exercise",
    "exercises",
    "project",
    "projects",
    "homework",
];
const CREATOR_ALIASES: &[&str] = &["creator", "author", "instructor", "created_by"];

impl ImportIngestionUseCase {
    /// Parse a nested-markup (YAML) document into raw records.
    pub(in crate::application::use_cases::import_ingestion) fn parse_nested(
        &self,
        content: &str,
    ) -> Result<Vec<RawRecord>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let yaml: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::ParseError(format!("Failed to parse document: {}", e)))?;
        let json = serde_json::to_value(&yaml)
            .map_err(|e| AppError::ParseError(format!("Failed to convert document: {}", e)))?;

        self.nested_value_to_records(&json)
    }

    fn nested_value_to_records(&self, root: &Value) -> Result<Vec<RawRecord>> {
        match root {
            Value::Array(items) => Ok(items.iter().filter_map(element_to_record).collect()),
            Value::Object(map) => {
                let syllabus = extract_syllabus_structure(map);
                if !syllabus.is_empty() {
                    return Ok(syllabus);
                }

                if let Some(Value::Array(courses)) = map.get("courses") {
                    return Ok(courses.iter().filter_map(element_to_record).collect());
                }

                Ok(vec![RawRecord::from_json_object(map)])
            }
            Value::Null => Ok(Vec::new()),
            _ => Ok(Vec::new()),
        }
    }
}

fn element_to_record(element: &Value) -> Option<RawRecord> {
    match element {
        Value::Object(map) => Some(RawRecord::from_json_object(map)),
        Value::String(s) if s.trim().len() >= 3 => {
            let mut record = RawRecord::new();
            record.set_text("topic", s.trim());
            Some(record)
        }
        _ => None,
    }
}

/// Extract the two-level "course name -> list of week objects" shape. Returns
/// an empty vec when the document does not have that shape.
fn extract_syllabus_structure(map: &serde_json::Map<String, Value>) -> Vec<RawRecord> {
    let mut records = Vec::new();

    for (course_name, value) in map {
        let normalized = normalize_key(course_name);
        // "courses" is the generic list fallback, not a course name.
        if OVERVIEW_KEYS.contains(&normalized.as_str()) || normalized == "courses" {
            continue;
        }
        let Value::Array(weeks) = value else {
            continue;
        };

        for (index, week) in weeks.iter().enumerate() {
            let Value::Object(week_obj) = week else {
                continue;
            };
            records.push(build_week_record(course_name, index + 1, week_obj));
        }
    }

    records
}

fn build_week_record(
    course_name: &str,
    week_number: usize,
    week_obj: &serde_json::Map<String, Value>,
) -> RawRecord {
    // Keep the original fields: unrecognized ones survive into the preview's
    // metadata during normalization.
    let mut record = RawRecord::from_json_object(week_obj);

    let topic = record
        .first_matching(TOPIC_ALIASES)
        .and_then(|value| match value {
            RawValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("{} - Week {}", course_name, week_number));
    record.set_text("topic", topic.clone());

    // Links: recognized resource aliases plus a recursive scan of every
    // string value in the week object.
    let mut link_text = String::new();
    for alias in RESOURCE_ALIASES {
        match record.get(alias) {
            Some(RawValue::Text(s)) => {
                link_text.push_str(s);
                link_text.push('\n');
            }
            Some(RawValue::List(items)) => {
                for item in items {
                    link_text.push_str(item);
                    link_text.push('\n');
                }
            }
            _ => {}
        }
    }
    for s in record.collect_strings() {
        link_text.push_str(s);
        link_text.push('\n');
    }
    LinkExtractor::extract(&link_text).merge_into_record(&mut record);

    if let Some(subtopics) = resolve_list(&record, SUBTOPIC_ALIASES) {
        record.set_list("subtopics", subtopics);
    }
    if let Some(tasks) = resolve_list(&record, TASK_ALIASES) {
        record.set_list("tasks", tasks);
    }

    if record.text("description").is_none() {
        let mut parts = vec![topic];
        if let Some(subtopics) = record.list("subtopics") {
            if !subtopics.is_empty() {
                parts.push(subtopics.join(", "));
            }
        }
        if let Some(RawValue::Text(creator)) = record.first_matching(CREATOR_ALIASES) {
            parts.push(format!("by {}", creator));
        }
        record.set_text("description", parts.join(" | "));
    }

    if record.text("week").is_none() {
        record.set_text("week", week_number.to_string());
    }
    record.set_text("course_name", course_name);
    if record.text("difficulty").is_none() {
        record.set_text("difficulty", "Beginner");
    }

    record.dedup_lists();
    record
}

/// Resolve a list-like field from aliases, splitting delimited strings on
/// comma/semicolon/pipe.
fn resolve_list(record: &RawRecord, aliases: &[&str]) -> Option<Vec<String>> {
    match record.first_matching(aliases)? {
        RawValue::Text(s) => Some(
            s.split(|c| c == ',' || c == ';' || c == '|')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        RawValue::List(items) => Some(items.clone()),
        RawValue::Nested(_) => None,
    }
}
