//! CSV Event Reader
//!
//! Reads keyed intervals from CSV with flexible column mapping.
//! Bounds are timestamps converted to Unix milliseconds, or integers.

use super::IoError;
use crate::config::InputConfig;
use crate::merge::Event;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::path::Path;

/// Maximum number of row errors kept in a report
const MAX_REPORTED_ERRORS: usize = 100;

/// CSV reader with configurable column mapping
#[derive(Debug, Clone)]
pub struct EventReader {
    /// Key column (header name or 0-based index)
    key_column: String,
    /// Start column (header name or 0-based index)
    start_column: String,
    /// End column (header name or 0-based index)
    end_column: String,
    /// Whether the CSV has a header row
    has_header: bool,
    /// Field delimiter
    delimiter: u8,
    /// Format string for parsing timestamp bounds
    timestamp_format: Option<String>,
    /// Abort on the first bad row
    strict: bool,
}

/// Result of reading a CSV source
#[derive(Debug)]
pub struct ImportReport {
    pub events: Vec<Event<String, i64>>,
    pub rows_read: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReader {
    /// Create a reader for `key,start,end` columns with a header row
    pub fn new() -> Self {
        Self {
            key_column: "key".to_string(),
            start_column: "start".to_string(),
            end_column: "end".to_string(),
            has_header: true,
            delimiter: b',',
            timestamp_format: None,
            strict: false,
        }
    }

    /// Create a reader from input configuration
    pub fn from_config(config: &InputConfig) -> Self {
        let mut reader = Self::new()
            .with_key_column(&config.key_column)
            .with_start_column(&config.start_column)
            .with_end_column(&config.end_column)
            .with_header(config.has_header)
            .with_delimiter(config.delimiter)
            .strict(config.strict);
        reader.timestamp_format = config.timestamp_format.clone();
        reader
    }

    /// Set the key column
    pub fn with_key_column(mut self, column: &str) -> Self {
        self.key_column = column.to_string();
        self
    }

    /// Set the start column
    pub fn with_start_column(mut self, column: &str) -> Self {
        self.start_column = column.to_string();
        self
    }

    /// Set the end column
    pub fn with_end_column(mut self, column: &str) -> Self {
        self.end_column = column.to_string();
        self
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the field delimiter (ASCII only; others fall back to ',')
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = u8::try_from(delimiter).unwrap_or(b',');
        self
    }

    /// Set the timestamp format string
    pub fn with_timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = Some(format.to_string());
        self
    }

    /// Abort on the first bad row instead of recording it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read events from a CSV file
    pub fn read_path(&self, path: &Path) -> Result<ImportReport, IoError> {
        let reader = self.builder().from_path(path)?;
        tracing::debug!("Reading events from {:?}", path);
        self.read_from(reader)
    }

    /// Read events from a CSV string
    pub fn read_str(&self, csv_data: &str) -> Result<ImportReport, IoError> {
        let reader = self.builder().from_reader(csv_data.as_bytes());
        self.read_from(reader)
    }

    fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(self.has_header)
            .delimiter(self.delimiter)
            .flexible(true);
        builder
    }

    fn read_from<R: std::io::Read>(
        &self,
        mut reader: csv::Reader<R>,
    ) -> Result<ImportReport, IoError> {
        let headers = if self.has_header {
            Some(reader.headers()?.clone())
        } else {
            None
        };

        let key_idx = resolve_column(&self.key_column, headers.as_ref(), ("key", 0))?;
        let start_idx = resolve_column(&self.start_column, headers.as_ref(), ("start", 1))?;
        let end_idx = resolve_column(&self.end_column, headers.as_ref(), ("end", 2))?;

        let mut events = Vec::new();
        let mut rows_read = 0;
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = if self.has_header {
                line_num + 2
            } else {
                line_num + 1
            };
            rows_read += 1;

            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| self.parse_record(&record, key_idx, start_idx, end_idx));

            match parsed {
                Ok(event) => events.push(event),
                Err(message) => {
                    if self.strict {
                        return Err(IoError::InvalidRow {
                            line: actual_line,
                            message,
                        });
                    }
                    errors.push(format!("Line {}: {}", actual_line, message));
                    rows_failed += 1;
                }
            }
        }

        if rows_failed > 0 {
            tracing::warn!("Skipped {} of {} rows", rows_failed, rows_read);
        }

        // Truncate errors if too many
        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }

        Ok(ImportReport {
            events,
            rows_read,
            rows_failed,
            errors,
        })
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        key_idx: usize,
        start_idx: usize,
        end_idx: usize,
    ) -> Result<Event<String, i64>, String> {
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| format!("missing {} column", name))
        };

        let key = field(key_idx, "key")?;
        let start = self
            .parse_bound(field(start_idx, "start")?)
            .map_err(|e| e.to_string())?;
        let end = self
            .parse_bound(field(end_idx, "end")?)
            .map_err(|e| e.to_string())?;

        Ok(Event::new(key.to_string(), start, end))
    }

    /// Parse a bound: a timestamp as Unix milliseconds, or an integer
    ///
    /// The configured timestamp format wins over the integer reading, so
    /// all-digit formats such as `%Y%m%d` apply.
    pub fn parse_bound(&self, value: &str) -> Result<i64, IoError> {
        let value = value.trim();

        if let Some(format) = &self.timestamp_format {
            if let Some(ms) = parse_with_format(value, format) {
                return Ok(ms);
            }
        }

        if let Ok(n) = value.parse::<i64>() {
            return Ok(n);
        }

        let formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%SZ",
            "%Y-%m-%d",
            "%Y/%m/%d",
        ];

        for fmt in formats {
            if let Some(ms) = parse_with_format(value, fmt) {
                return Ok(ms);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc).timestamp_millis());
        }

        Err(IoError::ParseBound(value.to_string()))
    }
}

/// Date-only values resolve to midnight UTC
fn parse_with_format(value: &str, format: &str) -> Option<i64> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

/// Locate a column by header name (case-insensitive) or by 0-based index
///
/// Without a header row, the default column name maps to its default
/// position (`key,start,end` → 0, 1, 2).
fn resolve_column(
    column: &str,
    headers: Option<&csv::StringRecord>,
    (default_name, default_idx): (&str, usize),
) -> Result<usize, IoError> {
    match headers {
        Some(headers) => {
            if let Some(idx) = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column.trim()))
            {
                return Ok(idx);
            }
        }
        None => {
            if column.trim().eq_ignore_ascii_case(default_name) {
                return Ok(default_idx);
            }
        }
    }

    column
        .trim()
        .parse::<usize>()
        .map_err(|_| IoError::MissingColumn(column.to_string()))
}
