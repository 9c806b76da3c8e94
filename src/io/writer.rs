//! Window Writer
//!
//! Renders merged windows (and per-event annotations) as an aligned table,
//! CSV or pretty JSON.

use super::IoError;
use crate::merge::{AnnotatedEvent, MergedWindow};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::str::FromStr;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}. Use: table, csv, json", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// How bounds (Unix milliseconds) are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundFormat {
    /// The integer as read
    #[default]
    Raw,
    /// UTC calendar date
    Date,
    /// UTC date and time
    DateTime,
}

impl FromStr for BoundFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(BoundFormat::Raw),
            "date" => Ok(BoundFormat::Date),
            "datetime" => Ok(BoundFormat::DateTime),
            other => Err(format!("Unknown bound format: {}. Use: raw, date, datetime", other)),
        }
    }
}

/// Renders windows and annotations
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowWriter {
    format: OutputFormat,
    bound_format: BoundFormat,
}

const WINDOW_COLUMNS: [&str; 4] = ["key", "window_start", "window_end", "event_count"];

const ANNOTATION_COLUMNS: [&str; 6] = [
    "key",
    "start",
    "end",
    "running_max_end",
    "is_new_group",
    "group_id",
];

impl WindowWriter {
    pub fn new(format: OutputFormat, bound_format: BoundFormat) -> Self {
        Self {
            format,
            bound_format,
        }
    }

    /// Render one bound
    pub fn bound(&self, millis: i64) -> Value {
        let pattern = match self.bound_format {
            BoundFormat::Raw => return json!(millis),
            BoundFormat::Date => "%Y-%m-%d",
            BoundFormat::DateTime => "%Y-%m-%dT%H:%M:%SZ",
        };

        chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| json!(dt.format(pattern).to_string()))
            .unwrap_or_else(|| json!(millis))
    }

    /// Write windows in the configured format
    pub fn write_windows<W: Write>(
        &self,
        out: W,
        windows: &[MergedWindow<String, i64>],
    ) -> Result<(), IoError> {
        let rows = windows
            .iter()
            .map(|w| {
                vec![
                    json!(w.key),
                    self.bound(w.window_start),
                    self.bound(w.window_end),
                    json!(w.event_count),
                ]
            })
            .collect();

        self.write_rows(out, &WINDOW_COLUMNS, rows)
    }

    /// Write per-event annotations in the configured format
    pub fn write_annotations<W: Write>(
        &self,
        out: W,
        annotated: &[AnnotatedEvent<String, i64>],
    ) -> Result<(), IoError> {
        let rows = annotated
            .iter()
            .map(|a| {
                vec![
                    json!(a.event.key),
                    self.bound(a.event.start),
                    self.bound(a.event.end),
                    a.running_max_end.map(|m| self.bound(m)).unwrap_or(Value::Null),
                    json!(a.is_new_group),
                    json!(a.group_id),
                ]
            })
            .collect();

        self.write_rows(out, &ANNOTATION_COLUMNS, rows)
    }

    /// Render windows to a string
    pub fn render_windows(&self, windows: &[MergedWindow<String, i64>]) -> Result<String, IoError> {
        let mut buf = Vec::new();
        self.write_windows(&mut buf, windows)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_rows<W: Write>(
        &self,
        out: W,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<(), IoError> {
        match self.format {
            OutputFormat::Table => write_table(out, columns, &rows),
            OutputFormat::Csv => write_csv(out, columns, &rows),
            OutputFormat::Json => write_json(out, columns, rows),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_table<W: Write>(mut out: W, columns: &[&str], rows: &[Vec<Value>]) -> Result<(), IoError> {
    if rows.is_empty() {
        writeln!(out, "No windows")?;
        return Ok(());
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| match v {
                    Value::Null => "-".to_string(),
                    other => cell_text(other),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(columns.to_vec()))?;
    writeln!(
        out,
        "{}",
        "-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1))
    )?;
    for row in &cells {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }

    Ok(())
}

fn write_csv<W: Write>(out: W, columns: &[&str], rows: &[Vec<Value>]) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(mut out: W, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<(), IoError> {
    let objects: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let map: serde_json::Map<String, Value> = columns
                .iter()
                .map(|c| c.to_string())
                .zip(row)
                .collect();
            Value::Object(map)
        })
        .collect();

    serde_json::to_writer_pretty(&mut out, &objects)?;
    writeln!(out)?;
    Ok(())
}
