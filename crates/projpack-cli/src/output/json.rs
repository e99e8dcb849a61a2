//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use projpack_core::ArchiveReport;
use projpack_core::PackagingResult;
use projpack_core::ProjectSpec;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct PackOutput<'a> {
    #[serde(flatten)]
    result: &'a PackagingResult,
    report: Option<ReportOutput>,
    saved: bool,
}

#[derive(Serialize)]
struct ReportOutput {
    files_added: usize,
    symlinks_added: usize,
    bytes_read: u64,
    bytes_written: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    duration_ms: u128,
}

impl From<&ArchiveReport> for ReportOutput {
    fn from(report: &ArchiveReport) -> Self {
        Self {
            files_added: report.files_added,
            symlinks_added: report.symlinks_added,
            bytes_read: report.bytes_read,
            bytes_written: report.bytes_written,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct ProjectsOutput<'a> {
    count: usize,
    projects: &'a [ProjectSpec],
}

#[derive(Serialize)]
struct MessageData {
    message: String,
}

impl OutputFormatter for JsonFormatter {
    fn format_packaging_result(&self, result: &PackagingResult, saved: bool) -> Result<()> {
        let data = PackOutput {
            result,
            report: result.report.as_ref().map(ReportOutput::from),
            saved,
        };
        let output = JsonOutput::success("pack", data);
        Self::output(&output)
    }

    fn format_projects(&self, projects: &[ProjectSpec]) -> Result<()> {
        let data = ProjectsOutput {
            count: projects.len(),
            projects,
        };
        Self::output(&JsonOutput::success("projects", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, operation: &str, message: &str) {
        let output = JsonOutput::success(
            operation,
            MessageData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        let output = JsonOutput::success(
            "warning",
            MessageData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
