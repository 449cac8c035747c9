//! Delimited-text (CSV) reader
//!
//! First record is the header row. Quoted fields may contain the delimiter,
//! line breaks and doubled quotes (`""` reads as one `"`). Headers are
//! trimmed; cells are kept verbatim so quoted passwords keep their spaces.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Field delimiter for import files
pub const DELIMITER: u8 = b',';

/// A parsed delimited file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Parse `text`, padding short rows and skipping blank rows and rows
    /// wider than the header
    pub fn parse(text: &str, delimiter: u8) -> Self {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = match reader.headers() {
            Ok(headers) => headers.iter().map(str::to_string).collect(),
            Err(e) => {
                debug!("Unreadable CSV header row: {}", e);
                return Self::default();
            }
        };
        if headers.iter().all(|h| h.is_empty()) {
            return Self::default();
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping unreadable CSV row: {}", e);
                    continue;
                }
            };
            if is_blank(&record) {
                continue;
            }
            if record.len() > headers.len() {
                debug!(
                    "Skipping row at line {}: {} cells for {} headers",
                    record.position().map_or(0, |p| p.line()),
                    record.len(),
                    headers.len()
                );
                continue;
            }

            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Self { headers, rows }
    }

    pub fn has_headers(&self, required: &[&str]) -> bool {
        required
            .iter()
            .all(|name| self.headers.iter().any(|h| h == name))
    }

    /// Rows keyed by header name
    pub fn records(&self) -> impl Iterator<Item = HashMap<&str, &str>> + '_ {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
