use super::ImportIngestionUseCase;

use crate::application::use_cases::link_extractor::LinkExtractor;
use crate::domain::error::{AppError, Result};
use crate::domain::raw_record::{RawRecord, RawValue};

use serde_json::Value;

const TITLE_ALIASES: &[&str] = &["title", "name", "course", "course_name", "subject", "heading"];

impl ImportIngestionUseCase {
    /// Parse a generic-object (JSON) document: each top-level array element,
    /// or the single top-level object, becomes one raw record.
    pub(in crate::application::use_cases::import_ingestion) fn parse_object(
        &self,
        content: &str,
    ) -> Result<Vec<RawRecord>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let root: Value = serde_json::from_str(content)
            .map_err(|e| AppError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        let records = match &root {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(object_to_record(map)),
                    Value::String(s) if s.trim().len() >= 3 => {
                        let mut record = RawRecord::new();
                        record.set_text("topic", s.trim());
                        Some(record)
                    }
                    _ => None,
                })
                .collect(),
            Value::Object(map) => vec![object_to_record(map)],
            _ => Vec::new(),
        };

        Ok(records)
    }
}

fn object_to_record(map: &serde_json::Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::from_json_object(map);

    // Default the topic from a title-like field when no topic is present.
    if record.text("topic").is_none() {
        if let Some(RawValue::Text(title)) = record.first_matching(TITLE_ALIASES) {
            let title = title.trim().to_string();
            if !title.is_empty() {
                record.set_text("topic", title);
            }
        }
    }

    // Backfill links the record holds under unrecognized field names by
    // scanning its serialized form.
    let serialized = record.to_json().to_string();
    LinkExtractor::extract(&serialized).merge_into_record(&mut record);
    record.dedup_lists();

    record
}
