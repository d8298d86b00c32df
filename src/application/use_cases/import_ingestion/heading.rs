use super::ImportIngestionUseCase;

use crate::application::use_cases::link_extractor::LinkExtractor;
use crate::domain::error::Result;
use crate::domain::raw_record::RawRecord;

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*\s*$").unwrap());

static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*+•]|\d+[.)])\s+(.+)$").unwrap());

static TASK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:task|assignment|exercise|practice|project|homework)\b\s*[:\-]?\s*(.+)$")
        .unwrap()
});

const MIN_DESCRIPTION_LENGTH: usize = 30;

impl ImportIngestionUseCase {
    /// Parse lightweight-markup (Markdown) text: each heading opens a record.
    pub(in crate::application::use_cases::import_ingestion) fn parse_heading(
        &self,
        content: &str,
    ) -> Result<Vec<RawRecord>> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut current: Option<RawRecord> = None;
        let mut saw_heading = false;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = HEADING_LINE.captures(line) {
                close(&mut records, current.take());
                let topic = caps[1].trim_matches(|c| c == '*' || c == '_' || c == '`').trim();
                let mut record = RawRecord::new();
                record.set_text("topic", topic);
                current = Some(record);
                saw_heading = true;
                continue;
            }

            let Some(record) = current.as_mut() else {
                continue;
            };

            if let Some(caps) = BULLET_LINE.captures(line) {
                let item = caps[1].trim();
                let links = LinkExtractor::extract(item);
                if links.is_empty() {
                    record.push_list_item("subtopics", item);
                } else {
                    links.merge_into_record(record);
                }
                continue;
            }

            if let Some(caps) = TASK_LINE.captures(line) {
                record.push_list_item("tasks", caps[1].trim());
                continue;
            }

            let links = LinkExtractor::extract(line);
            if !links.is_empty() {
                links.merge_into_record(record);
                continue;
            }

            if record.text("description").is_none()
                && line.len() >= MIN_DESCRIPTION_LENGTH
                && !line.contains(':')
            {
                record.set_text("description", line);
            }
        }

        close(&mut records, current.take());

        // No headings anywhere: keep whatever links the file holds in one
        // synthetic catch-all record.
        if !saw_heading && records.is_empty() {
            let links = LinkExtractor::extract(content);
            if !links.is_empty() {
                let mut record = RawRecord::new();
                record.set_text("topic", "Extracted Resources");
                links.merge_into_record(&mut record);
                close(&mut records, Some(record));
            }
        }

        Ok(records)
    }
}

fn close(records: &mut Vec<RawRecord>, record: Option<RawRecord>) {
    if let Some(mut record) = record {
        if !record.is_empty() {
            record.dedup_lists();
            records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_open_records() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "\
# HTML Fundamentals
A gentle introduction to semantic markup and page structure
- Elements
- Attributes
- https://youtu.be/abc12345
Exercise: Build a landing page

## CSS Layout
- Flexbox
- Grid
";
        let records = ingestion.parse_heading(content).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].text("topic"), Some("HTML Fundamentals"));
        assert_eq!(
            records[0].text("description"),
            Some("A gentle introduction to semantic markup and page structure")
        );
        assert_eq!(
            records[0].list("subtopics"),
            Some(&["Elements".to_string(), "Attributes".to_string()][..])
        );
        assert_eq!(records[0].list("youtube_links").map(|l| l.len()), Some(1));
        assert_eq!(
            records[0].list("tasks"),
            Some(&["Build a landing page".to_string()][..])
        );

        assert_eq!(records[1].text("topic"), Some("CSS Layout"));
    }

    #[test]
    fn test_link_bearing_bullet_is_extracted_not_subtopic() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "# Reading\n- Guide: https://example.com/guide.pdf\n";
        let records = ingestion.parse_heading(content).unwrap();
        assert_eq!(records[0].list("pdf_links").map(|l| l.len()), Some(1));
        assert!(records[0].list("subtopics").is_none());
    }

    #[test]
    fn test_no_headings_but_links_yields_catch_all() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "some notes\nhttps://youtu.be/abc12345\n";
        let records = ingestion.parse_heading(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Extracted Resources"));
    }

    #[test]
    fn test_no_headings_and_no_links_yields_nothing() {
        let ingestion = ImportIngestionUseCase::new();
        let records = ingestion.parse_heading("just prose with nothing useful\n").unwrap();
        assert!(records.is_empty());
    }
}
