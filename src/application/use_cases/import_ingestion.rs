use crate::domain::error::{AppError, Result};
use crate::domain::raw_record::RawRecord;

use tracing::info;

mod heading;
mod nested;
mod object;
mod spreadsheet;
mod structured_text;

/// Parses raw file content into an ordered sequence of loosely-typed raw
/// records. Parser selection happens by file extension; pasted text is routed
/// by content sniffing.
pub struct ImportIngestionUseCase;

impl ImportIngestionUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch on the file extension and parse the content into raw records,
    /// preserving source order.
    pub fn parse_source(&self, file_name: &str, content: &[u8]) -> Result<Vec<RawRecord>> {
        let extension = file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != file_name)
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| {
                AppError::FormatError(format!("File has no extension: {}", file_name))
            })?;

        info!(file_name, extension, "Parsing import source");

        let records = match extension.as_str() {
            "xlsx" | "xls" => self.parse_spreadsheet(&extension, content)?,
            "csv" | "tsv" => self.parse_delimited(&self.decode_text(content))?,
            "txt" | "text" => self.parse_structured_text(&self.decode_text(content))?,
            "json" => self.parse_object(&self.decode_text(content))?,
            "yaml" | "yml" => self.parse_nested(&self.decode_text(content))?,
            "md" | "markdown" => self.parse_heading(&self.decode_text(content))?,
            _ => {
                return Err(AppError::FormatError(format!(
                    "Unsupported file type: {}",
                    extension
                )))
            }
        };

        info!(file_name, records = records.len(), "Parsed import source");

        Ok(records)
    }

    /// Route pasted free text by sniffing its shape: JSON goes through the
    /// object parser, genuinely nested YAML through the nested parser, and
    /// everything else through the structured text parser.
    pub fn parse_pasted_text(&self, text: &str) -> Result<Vec<RawRecord>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
                return self.parse_object(trimmed);
            }
        }

        if self.looks_like_nested_markup(trimmed) {
            return self.parse_nested(trimmed);
        }

        self.parse_structured_text(trimmed)
    }

    /// YAML parses almost any text into a mapping, so only treat the input as
    /// nested markup when at least one top-level value is itself a sequence
    /// or mapping.
    fn looks_like_nested_markup(&self, text: &str) -> bool {
        match serde_yaml::from_str::<serde_yaml::Value>(text) {
            Ok(serde_yaml::Value::Mapping(map)) => map
                .values()
                .any(|value| value.is_sequence() || value.is_mapping()),
            Ok(serde_yaml::Value::Sequence(_)) => true,
            _ => false,
        }
    }

    /// Decode file bytes to text: UTF-8 first, then WINDOWS-1252, then lossy.
    fn decode_text(&self, content: &[u8]) -> String {
        if let Ok(text) = std::str::from_utf8(content) {
            return text.to_string();
        }

        let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(content);
        if !had_errors {
            return decoded.into_owned();
        }

        String::from_utf8_lossy(content).to_string()
    }
}

impl Default for ImportIngestionUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_is_a_format_error() {
        let ingestion = ImportIngestionUseCase::new();
        let err = ingestion.parse_source("notes.exe", b"whatever").unwrap_err();
        assert!(matches!(err, AppError::FormatError(_)));

        let err = ingestion.parse_source("no-extension", b"whatever").unwrap_err();
        assert!(matches!(err, AppError::FormatError(_)));
    }

    #[test]
    fn test_every_supported_extension_dispatches() {
        let ingestion = ImportIngestionUseCase::new();
        // Text-based formats parse empty content to zero records instead of
        // failing on dispatch.
        for name in [
            "a.csv", "a.tsv", "a.txt", "a.text", "a.json", "a.yaml", "a.yml", "a.md",
            "a.markdown",
        ] {
            let content: &[u8] = if name.ends_with("json") { b"[]" } else { b"" };
            let result = ingestion.parse_source(name, content);
            assert!(result.is_ok(), "{} should dispatch: {:?}", name, result.err());
            assert!(result.unwrap().is_empty());
        }
    }

    #[test]
    fn test_pasted_json_routes_to_object_parser() {
        let ingestion = ImportIngestionUseCase::new();
        let records = ingestion
            .parse_pasted_text(r#"[{"title": "Rust Basics", "links": ["https://youtu.be/abc12345"]}]"#)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Rust Basics"));
    }

    #[test]
    fn test_pasted_plain_text_routes_to_structured_parser() {
        let ingestion = ImportIngestionUseCase::new();
        let records = ingestion
            .parse_pasted_text("Topic: Networking\nYouTube: https://youtu.be/abc12345")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Networking"));
    }

    #[test]
    fn test_windows_1252_content_is_decoded() {
        let ingestion = ImportIngestionUseCase::new();
        // "Caf\xe9" is WINDOWS-1252 for "Café".
        let decoded = ingestion.decode_text(b"Topic: Caf\xe9");
        assert_eq!(decoded, "Topic: Café");
    }
}
