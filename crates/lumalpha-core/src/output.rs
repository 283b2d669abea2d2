//! Machine-readable batch reports in JSON or JSON Lines.
//!
//! The core never writes reports to disk on its own; callers hand in any
//! `Write` (usually stdout) when they want one.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{BatchReport, BatchStatus, TransformResult};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The whole report as one JSON object
    Json,
    /// One JSON object per file, then a summary line
    JsonLines,
}

/// Closing line of a JSON Lines report.
#[derive(Debug, Serialize)]
struct SummaryLine {
    #[serde(rename = "type")]
    kind: &'static str,
    status: BatchStatus,
    succeeded: usize,
    failed: usize,
    total: usize,
    requested: usize,
    elapsed_seconds: f64,
}

impl From<&BatchReport> for SummaryLine {
    fn from(report: &BatchReport) -> Self {
        Self {
            kind: "summary",
            status: report.status(),
            succeeded: report.succeeded,
            failed: report.failed,
            total: report.total,
            requested: report.requested,
            elapsed_seconds: report.elapsed_seconds,
        }
    }
}

/// Report with its derived status, for the single-object JSON form.
#[derive(Debug, Serialize)]
struct ReportWithStatus<'a> {
    status: BatchStatus,
    #[serde(flatten)]
    report: &'a BatchReport,
}

/// Serializes batch results to JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one per-file result as a JSON line.
    ///
    /// Used to stream results while a batch is still running.
    pub fn write_result(&mut self, result: &TransformResult) -> io::Result<()> {
        self.write_line(result)
    }

    /// Write a finished report.
    ///
    /// JSON writes a single object with every result; JSONL writes one line
    /// per result followed by a summary line.
    pub fn write_report(&mut self, report: &BatchReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let value = ReportWithStatus {
                    status: report.status(),
                    report,
                };
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &value)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &value).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += 1;
            }
            OutputFormat::JsonLines => {
                for result in &report.results {
                    self.write_line(result)?;
                }
                self.write_summary(report)?;
            }
        }
        Ok(())
    }

    /// Write only the summary line (JSONL streams that already wrote results).
    pub fn write_summary(&mut self, report: &BatchReport) -> io::Result<()> {
        self.write_line(&SummaryLine::from(report))
    }

    fn write_line<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransformOutcome;
    use std::path::PathBuf;

    fn sample_report() -> BatchReport {
        let mut report = BatchReport::new(2);
        report.push(TransformResult {
            index: 0,
            source: PathBuf::from("/in/a.png"),
            outcome: TransformOutcome::Success {
                output: PathBuf::from("/out/a.png"),
            },
        });
        report.push(TransformResult {
            index: 1,
            source: PathBuf::from("/in/b.jpg"),
            outcome: TransformOutcome::DecodeError {
                detail: "Corrupt image".to_string(),
            },
        });
        report
    }

    #[test]
    fn test_write_report_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_report(&sample_report()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "completed_with_errors");
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["results"][1]["status"], "decode_error");
    }

    #[test]
    fn test_write_report_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_report(&sample_report()).unwrap();
        assert_eq!(writer.items_written(), 3);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"status\":\"success\""));
        assert!(lines[2].contains("\"type\":\"summary\""));
    }

    #[test]
    fn test_streamed_results_then_summary() {
        let report = sample_report();
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, false);
        for result in &report.results {
            writer.write_result(result).unwrap();
        }
        writer.write_summary(&report).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: TransformResult =
            serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.index, 0);
    }
}
