use super::ImportIngestionUseCase;

use crate::application::use_cases::link_extractor::LinkExtractor;
use crate::domain::error::Result;
use crate::domain::raw_record::RawRecord;

use once_cell::sync::Lazy;
use regex::Regex;

// A new record starts on "Topic:", "Course:", "Module 3", a heading marker,
// and similar prefixes.
static RECORD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:topic|course|title|module|lesson|chapter|week)\s*\d*\s*[:\-]\s*(.+)$")
        .unwrap()
});

static BARE_MODULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:module|lesson|chapter|week)\s+(\d+)\s*$").unwrap());

static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s+(.+)$").unwrap());

static DESCRIPTION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:description|desc|summary|details|overview|about)\s*[:\-]\s*(.*)$").unwrap()
});

static WEEK_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^week(?:\s*(?:number|no))?\s*[:\-]\s*(\d+)\s*$").unwrap());

static DURATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:duration|time|length)\s*[:\-]\s*(.+)$").unwrap());

static DIFFICULTY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:difficulty|level)\s*[:\-]\s*(.+)$").unwrap());

static VIDEO_LINKS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:youtube|videos?|video\s*links?|video\s*urls?|urls?|links?|resources?)\s*[:\-]\s*(.*)$")
        .unwrap()
});

static DOC_LINKS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:pdfs?|documents?|docs?|materials?|files?)\s*[:\-]\s*(.*)$").unwrap()
});

static SUBTOPICS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:sub\s*topics?|topics?|covers?|contents?|outline)\s*[:\-]\s*(.*)$").unwrap()
});

static TASKS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:tasks?|exercises?|assignments?|practice|projects?|homework)\s*[:\-]\s*(.*)$")
        .unwrap()
});

static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+(.+)$").unwrap());

impl ImportIngestionUseCase {
    /// Single-pass line state machine over structured plain text.
    pub(in crate::application::use_cases::import_ingestion) fn parse_structured_text(
        &self,
        content: &str,
    ) -> Result<Vec<RawRecord>> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut current: Option<RawRecord> = None;
        let mut found_structure = false;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            // "Week: 3" on an open record is a field, not a record start
            // ("Week 3: Networking" without an open value still opens one).
            if let (Some(record), Some(caps)) = (current.as_mut(), WEEK_PREFIX.captures(line)) {
                record.set_text("week", caps[1].trim());
                continue;
            }

            // Record-start lines close the current record and open a new one.
            if let Some(topic) = Self::record_start_topic(line) {
                close_record(&mut records, current.take());
                let mut record = RawRecord::new();
                record.set_text("topic", topic);
                current = Some(record);
                found_structure = true;
                continue;
            }

            if let Some(record) = current.as_mut() {
                if Self::apply_field_line(record, line) {
                    continue;
                }

                if let Some(caps) = BULLET_LINE.captures(line) {
                    let item = caps[1].trim();
                    if LinkExtractor::extract(item).is_empty() {
                        record.push_list_item("subtopics", item);
                    } else {
                        LinkExtractor::extract(item).merge_into_record(record);
                    }
                    continue;
                }

                // Bare URL lines feed the current record's link fields.
                let links = LinkExtractor::extract(line);
                if !links.is_empty() {
                    links.merge_into_record(record);
                    continue;
                }

                // A free line without any recognized shape becomes the
                // description if one is not set yet.
                if record.text("description").is_none() && line.len() >= 20 {
                    record.set_text("description", line);
                }
                continue;
            }

            // No record open yet: a comma-delimited line is treated as one
            // synthetic CSV row (first field topic, remainder scanned).
            if line.contains(',') {
                let mut parts = line.splitn(2, ',');
                let topic = parts.next().unwrap_or("").trim();
                if !topic.is_empty() && !LinkExtractor::is_link_shaped(topic) {
                    let mut record = RawRecord::new();
                    record.set_text("topic", topic);
                    if let Some(rest) = parts.next() {
                        let rest = rest.trim();
                        let links = LinkExtractor::extract(rest);
                        if links.is_empty() {
                            if !rest.is_empty() {
                                record.set_text("description", rest);
                            }
                        } else {
                            links.merge_into_record(&mut record);
                        }
                    }
                    close_record(&mut records, Some(record));
                    found_structure = true;
                    continue;
                }
            }
        }

        close_record(&mut records, current.take());

        if records.is_empty() && !found_structure {
            // No structured content at all: fall back to a single record
            // holding every link in the file, or topic-only records per line.
            let links = LinkExtractor::extract(content);
            if !links.is_empty() {
                let mut record = RawRecord::new();
                record.set_text("topic", "Extracted Resources");
                links.merge_into_record(&mut record);
                close_record(&mut records, Some(record));
            } else {
                for line in content.lines() {
                    let line = line.trim();
                    if line.len() < 4 || line.starts_with("//") {
                        continue;
                    }
                    let mut record = RawRecord::new();
                    record.set_text("topic", line);
                    records.push(record);
                }
            }
        }

        Ok(records)
    }

    fn record_start_topic(line: &str) -> Option<String> {
        if let Some(caps) = RECORD_START.captures(line) {
            return Some(caps[1].trim().to_string());
        }
        if BARE_MODULE.is_match(line) {
            return Some(line.to_string());
        }
        if let Some(caps) = HEADING_MARKER.captures(line) {
            return Some(caps[1].trim().to_string());
        }
        None
    }

    /// Try to interpret the line as a field-prefix line on the open record.
    /// Returns true when the line was consumed.
    fn apply_field_line(record: &mut RawRecord, line: &str) -> bool {
        if let Some(caps) = DESCRIPTION_PREFIX.captures(line) {
            let value = caps[1].trim();
            if !value.is_empty() {
                record.set_text("description", value);
            }
            return true;
        }
        if let Some(caps) = DURATION_PREFIX.captures(line) {
            record.set_text("duration", caps[1].trim());
            return true;
        }
        if let Some(caps) = DIFFICULTY_PREFIX.captures(line) {
            record.set_text("difficulty", caps[1].trim());
            return true;
        }
        if let Some(caps) = SUBTOPICS_PREFIX.captures(line) {
            for item in split_list(caps[1].trim()) {
                record.push_list_item("subtopics", item);
            }
            return true;
        }
        if let Some(caps) = TASKS_PREFIX.captures(line) {
            let value = caps[1].trim();
            let links = LinkExtractor::extract(value);
            if links.is_empty() {
                for item in split_list(value) {
                    record.push_list_item("tasks", item);
                }
            } else {
                links.merge_into_record(record);
            }
            return true;
        }
        // Link-bearing category prefixes run the extractor on the rest of the
        // line. Order matters: the more specific document prefix is tried
        // before the broad links/urls/resources prefix.
        if let Some(caps) = DOC_LINKS_PREFIX.captures(line) {
            LinkExtractor::extract(caps[1].trim()).merge_into_record(record);
            return true;
        }
        if let Some(caps) = VIDEO_LINKS_PREFIX.captures(line) {
            LinkExtractor::extract(caps[1].trim()).merge_into_record(record);
            return true;
        }
        false
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == '|')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Close a record: deduplicate every array field and append it.
fn close_record(records: &mut Vec<RawRecord>, record: Option<RawRecord>) {
    let Some(mut record) = record else {
        return;
    };
    if record.is_empty() {
        return;
    }
    record.dedup_lists();
    records.push(record);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_youtube_practice_scenario() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "Topic: Networking\nYouTube: https://youtu.be/abc12345\nPractice: Build a subnet calculator";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Networking"));
        assert_eq!(
            records[0].list("youtube_links"),
            Some(&["https://youtu.be/abc12345".to_string()][..])
        );
        assert_eq!(
            records[0].list("tasks"),
            Some(&["Build a subnet calculator".to_string()][..])
        );
    }

    #[test]
    fn test_multiple_records_and_bullets() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "\
Topic: Rust Basics
- Ownership
- Borrowing
- https://youtu.be/abc12345
Topic: Advanced Rust
Subtopics: Traits; Lifetimes | Macros";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].list("subtopics"),
            Some(&["Ownership".to_string(), "Borrowing".to_string()][..])
        );
        assert_eq!(records[0].list("youtube_links").map(|l| l.len()), Some(1));
        assert_eq!(
            records[1].list("subtopics"),
            Some(&["Traits".to_string(), "Lifetimes".to_string(), "Macros".to_string()][..])
        );
    }

    #[test]
    fn test_duplicate_links_are_deduped_on_close() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "\
Topic: Git
Links: https://youtu.be/abc12345
https://youtu.be/abc12345";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records[0].list("youtube_links").map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_links_only_file_yields_synthetic_record() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "https://youtu.be/abc12345\nhttps://example.com/syllabus.pdf";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Extracted Resources"));
        assert_eq!(records[0].list("youtube_links").map(|l| l.len()), Some(1));
        assert_eq!(records[0].list("pdf_links").map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_plain_lines_fall_back_to_topic_only_records() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "Photosynthesis\nCell Division\nok";
        let records = ingestion.parse_structured_text(content).unwrap();
        // "ok" is too short to be a topic.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("topic"), Some("Photosynthesis"));
    }

    #[test]
    fn test_comma_line_before_any_record_is_a_synthetic_csv_row() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "Databases, https://youtu.be/abc12345";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Databases"));
        assert_eq!(records[0].list("youtube_links").map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_bare_module_heading_opens_record() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "Module 1\nDescription: Introduction to the course materials";
        let records = ingestion.parse_structured_text(content).unwrap();
        assert_eq!(records[0].text("topic"), Some("Module 1"));
        assert_eq!(
            records[0].text("description"),
            Some("Introduction to the course materials")
        );
    }
}
