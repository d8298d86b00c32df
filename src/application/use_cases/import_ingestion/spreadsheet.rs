use super::ImportIngestionUseCase;

use crate::domain::error::{AppError, Result};
use crate::domain::raw_record::RawRecord;

use std::io::Cursor;

impl ImportIngestionUseCase {
    /// Parse an Excel workbook: the first worksheet only, first row as the
    /// header (lower-cased and trimmed), every following non-empty row as one
    /// raw record.
    pub(in crate::application::use_cases::import_ingestion) fn parse_spreadsheet(
        &self,
        extension: &str,
        content: &[u8],
    ) -> Result<Vec<RawRecord>> {
        use calamine::{Reader, Xls, Xlsx};

        let rows = match extension {
            "xls" => {
                let mut workbook: Xls<_> = Xls::new(Cursor::new(content)).map_err(|e| {
                    AppError::ParseError(format!("Failed to open Excel file: {}", e))
                })?;
                Self::read_first_worksheet(&mut workbook)?
            }
            _ => {
                let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content)).map_err(|e| {
                    AppError::ParseError(format!("Failed to open Excel file: {}", e))
                })?;
                Self::read_first_worksheet(&mut workbook)?
            }
        };

        Ok(Self::rows_to_records(rows))
    }

    fn read_first_worksheet<RS, R>(workbook: &mut R) -> Result<Vec<Vec<String>>>
    where
        RS: std::io::Read + std::io::Seek,
        R: calamine::Reader<RS>,
        R::Error: std::fmt::Display,
    {
        use calamine::DataType;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
            .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

        let mut rows = Vec::new();
        for row in range.rows() {
            let row_data: Vec<String> = row
                .iter()
                .map(|cell| {
                    cell.as_string()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("{}", cell))
                })
                .collect();
            rows.push(row_data);
        }

        Ok(rows)
    }

    /// Parse delimited text (CSV/TSV) with delimiter detection.
    pub(in crate::application::use_cases::import_ingestion) fn parse_delimited(
        &self,
        content: &str,
    ) -> Result<Vec<RawRecord>> {
        use csv::{ReaderBuilder, Trim};

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let delimiter = Self::detect_delimiter(content);
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(Self::rows_to_records(rows))
    }

    /// Turn header + data rows into raw records, skipping fully-empty rows.
    fn rows_to_records(rows: Vec<Vec<String>>) -> Vec<RawRecord> {
        let mut iter = rows.into_iter();
        let header: Vec<String> = match iter.next() {
            Some(row) => row
                .iter()
                .map(|cell| cell.trim().to_lowercase())
                .collect(),
            None => return Vec::new(),
        };

        let mut records = Vec::new();
        for row in iter {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let mut record = RawRecord::new();
            for (index, cell) in row.iter().enumerate() {
                let value = cell.trim();
                if value.is_empty() {
                    continue;
                }
                let name = header
                    .get(index)
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("column_{}", index + 1));
                record.set_text(&name, value);
            }

            if !record.is_empty() {
                records.push(record);
            }
        }

        records
    }

    /// Detect the delimiter (comma, semicolon, tab, pipe) by scoring each
    /// candidate on frequency and per-line consistency over a sample.
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &candidates {
            let sample_lines: Vec<_> = content.lines().take(10).collect();
            if sample_lines.is_empty() {
                continue;
            }

            let mut field_counts = Vec::new();
            for line in &sample_lines {
                let count = line.chars().filter(|&c| c as u8 == delimiter).count();
                field_counts.push(count);
            }

            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());
            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_become_records() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "Topic,YouTube,Week\nNetworking,https://youtu.be/abc12345,1\nLinux,,2";
        let records = ingestion.parse_delimited(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("topic"), Some("Networking"));
        assert_eq!(records[0].text("youtube"), Some("https://youtu.be/abc12345"));
        assert_eq!(records[1].text("week"), Some("2"));
        // Empty cells are not materialized as fields.
        assert!(!records[1].contains("youtube"));
    }

    #[test]
    fn test_fully_empty_rows_are_skipped() {
        let ingestion = ImportIngestionUseCase::new();
        let content = "topic,week\n,,\nRust,1\n , ";
        let records = ingestion.parse_delimited(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("topic"), Some("Rust"));
    }

    #[test]
    fn test_semicolon_delimiter_detection() {
        assert_eq!(ImportIngestionUseCase::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(ImportIngestionUseCase::detect_delimiter("a,b,c\nd,e,f"), b',');
    }

    #[test]
    fn test_empty_content_yields_zero_records() {
        let ingestion = ImportIngestionUseCase::new();
        assert!(ingestion.parse_delimited("").unwrap().is_empty());
        assert!(ingestion.parse_delimited("topic,week").unwrap().is_empty());
    }
}
