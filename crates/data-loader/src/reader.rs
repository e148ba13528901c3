//! Generic CSV reader with header-row semantics.
//!
//! `read_csv` never fails: an unreadable file is logged and yields an empty
//! batch, and a row the transformer rejects is dropped and recorded in the
//! batch's `LoadReport`. Callers cannot tell "file missing" from "file
//! empty" through the records alone; `LoadReport::source_readable` can.

use crate::error::{DataLoadError, Result};
use crate::parser::RawRow;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// How a row issue affected the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Row kept, one of its cells fell back to empty / zero
    Warning,
    /// Row dropped
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub line: usize,
    pub kind: IssueKind,
    pub message: String,
}

/// Summary of one file load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub file: String,
    pub source_readable: bool,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub issues: Vec<RowIssue>,
}

impl LoadReport {
    fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            ..Self::default()
        }
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::Warning)
            .count()
    }

    fn record(&mut self, line: usize, kind: IssueKind, message: String) {
        self.issues.push(RowIssue { line, kind, message });
    }
}

/// Records produced from one file plus the report describing the load
#[derive(Debug, Clone)]
pub struct CsvBatch<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

impl<T> CsvBatch<T> {
    fn empty(report: LoadReport) -> Self {
        Self {
            records: Vec::new(),
            report,
        }
    }
}

/// Read `path` as UTF-8 and transform every data row.
///
/// I/O failures (missing file, permissions, invalid UTF-8) are logged and
/// produce an empty batch whose report has `source_readable == false`.
pub fn read_csv<T, F>(path: &Path, transform: F) -> CsvBatch<T>
where
    F: FnMut(&mut RawRow) -> Result<T>,
{
    let label = path.display().to_string();
    match read_source(path) {
        Ok(contents) => parse_csv(contents.as_bytes(), &label, transform),
        Err(err) => {
            warn!(file = %label, error = %err, "could not read CSV file, treating as empty");
            CsvBatch::empty(LoadReport::new(&label))
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse CSV text from any reader. `label` names the source in the report
/// and in log lines.
pub fn parse_csv<R, T, F>(input: R, label: &str, mut transform: F) -> CsvBatch<T>
where
    R: Read,
    F: FnMut(&mut RawRow) -> Result<T>,
{
    let mut report = LoadReport::new(label);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        Err(source) => {
            let err = DataLoadError::Csv {
                file: label.to_string(),
                source,
            };
            warn!(file = %label, error = %err, "could not read CSV header, treating as empty");
            return CsvBatch::empty(report);
        }
    };
    report.source_readable = true;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        report.rows_read += 1;
        // header is line 1
        let fallback_line = idx + 2;

        let record = match result {
            Ok(record) => record,
            Err(source) => {
                let line = source
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                let err = DataLoadError::Csv {
                    file: label.to_string(),
                    source,
                };
                warn!(file = %label, line, error = %err, "skipping unreadable CSV row");
                report.rows_skipped += 1;
                report.record(line, IssueKind::Skipped, err.to_string());
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        let fields: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        let mut row = RawRow::new(line, fields);

        match transform(&mut row) {
            Ok(value) => {
                for message in row.take_warnings() {
                    debug!(file = %label, line, %message, "row warning");
                    report.record(line, IssueKind::Warning, message);
                }
                report.rows_kept += 1;
                records.push(value);
            }
            Err(err) => {
                warn!(file = %label, line, error = %err, "skipping invalid row");
                report.rows_skipped += 1;
                report.record(line, IssueKind::Skipped, err.to_string());
            }
        }
    }

    debug!(
        file = %label,
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        rows_skipped = report.rows_skipped,
        "parsed CSV"
    );
    CsvBatch { records, report }
}
