//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use projpack_core::ArchiveReport;
use projpack_core::PackagingResult;
use projpack_core::PackagingStatus;
use projpack_core::ProjectSpec;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn project_lines(&self, project: &ProjectSpec) -> Vec<String> {
        let mut lines = vec![project.project_path.display().to_string()];

        if self.verbose || !project.file_extensions.is_empty() {
            lines.push(format!(
                "  Extensions: {}",
                join_or_none(project.file_extensions.iter().cloned())
            ));
        }
        if self.verbose || !project.exclude_dirs.is_empty() {
            lines.push(format!(
                "  Excluded:   {}",
                join_or_none(project.exclude_dirs.iter().map(|d| d.display().to_string()))
            ));
        }

        lines
    }
}

/// Summary lines printed after the file listing.
fn report_lines(report: &ArchiveReport) -> Vec<String> {
    let mut lines = vec![format!("  Files added:      {}", report.files_added)];
    if report.symlinks_added > 0 {
        lines.push(format!("  Symlinks added:   {}", report.symlinks_added));
    }
    lines.push(format!(
        "  Content size:     {}",
        humanize_bytes(report.bytes_read)
    ));
    lines.push(format!(
        "  Archive size:     {}",
        humanize_bytes(report.bytes_written)
    ));
    if report.bytes_read > 0 {
        lines.push(format!(
            "  Compression:      {:.1}%",
            report.compression_percentage()
        ));
    }
    lines
}

fn join_or_none(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_packaging_result(&self, result: &PackagingResult, saved: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match result.status {
            PackagingStatus::Packaged => {
                let mut lines = result.message.lines();
                if let Some(headline) = lines.next() {
                    self.format_success("pack", headline);
                }
                for line in lines {
                    let _ = self.term.write_line(line);
                }
                if let Some(report) = &result.report {
                    let _ = self.term.write_line("");
                    for line in report_lines(report) {
                        let _ = self.term.write_line(&line);
                    }
                }
            }
            PackagingStatus::NothingToPackage | PackagingStatus::Failed => {
                self.format_warning(&result.message);
            }
        }

        if saved {
            self.format_success("pack", "Project selection saved");
        }

        Ok(())
    }

    fn format_projects(&self, projects: &[ProjectSpec]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if projects.is_empty() {
            let _ = self.term.write_line("No saved projects");
            return Ok(());
        }

        for (index, project) in projects.iter().enumerate() {
            if index > 0 {
                let _ = self.term.write_line("");
            }
            for line in self.project_lines(project) {
                let _ = self.term.write_line(&line);
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_success(&self, _operation: &str, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_project_lines_hide_empty_lists() {
        let formatter = HumanFormatter::new(false, false);
        let project = ProjectSpec::new("/p", [".py", ".md"], Vec::<PathBuf>::new());
        assert_eq!(
            formatter.project_lines(&project),
            ["/p", "  Extensions: .py, .md"]
        );
    }

    #[test]
    fn test_project_lines_verbose_shows_everything() {
        let formatter = HumanFormatter::new(true, false);
        let project = ProjectSpec::new("/p", Vec::<String>::new(), ["build"]);
        assert_eq!(
            formatter.project_lines(&project),
            ["/p", "  Extensions: (none)", "  Excluded:   build"]
        );
    }

    #[test]
    fn test_report_lines() {
        let mut report = ArchiveReport::new("/out/proj.tar.gz");
        report.files_added = 2;
        report.bytes_read = 2048;
        report.bytes_written = 512;

        let lines = report_lines(&report);
        assert_eq!(lines[0], "  Files added:      2");
        assert!(lines.iter().all(|line| !line.contains("Symlinks")));
        assert_eq!(lines.last().unwrap(), "  Compression:      75.0%");
    }

    #[test]
    fn test_report_lines_with_symlinks_and_no_content() {
        let mut report = ArchiveReport::new("/out/proj.tar.gz");
        report.symlinks_added = 1;
        report.bytes_written = 120;

        let lines = report_lines(&report);
        assert!(lines.contains(&"  Symlinks added:   1".to_string()));
        assert!(lines.iter().all(|line| !line.contains("Compression")));
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(std::iter::empty()), "(none)");
        assert_eq!(
            join_or_none(["a".to_string(), "b".to_string()].into_iter()),
            "a, b"
        );
    }
}
