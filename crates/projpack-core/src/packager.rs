//! Packaging runs: walk, archive and list a project in one call.
//!
//! A run never returns an error. Every outcome, including failures, is a
//! [`PackagingResult`] whose message explains what happened.

use crate::PackConfig;
use crate::PackError;
use crate::ProgressCallback;
use crate::ProjectSpec;
use crate::Result;
use crate::archive;
use crate::report::ArchiveReport;
use crate::report::NoopProgress;
use crate::tree;
use crate::walker::gather_files;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Message reported when no file matched.
pub const NOTHING_TO_PACKAGE: &str = "no files to package";

/// Outcome of a packaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingStatus {
    /// An archive was written.
    Packaged,
    /// No file matched; nothing was written.
    NothingToPackage,
    /// The run failed.
    Failed,
}

impl fmt::Display for PackagingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::Packaged => "packaged",
            Self::NothingToPackage => "nothing to package",
            Self::Failed => "failed",
        };
        f.write_str(status)
    }
}

/// Result of a packaging run.
///
/// `output_path` and `report` are set only when `status` is
/// [`PackagingStatus::Packaged`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagingResult {
    /// Human-readable description of the outcome.
    pub message: String,
    /// Location of the written archive.
    pub output_path: Option<PathBuf>,
    /// Outcome of the run.
    pub status: PackagingStatus,
    /// Counts and sizes of the written archive.
    #[serde(skip)]
    pub report: Option<ArchiveReport>,
}

impl PackagingResult {
    fn packaged(report: ArchiveReport, listing: &str) -> Self {
        Self {
            message: format!(
                "Archive created at: {}\nPackaged files:\n{listing}",
                report.output_path.display()
            ),
            output_path: Some(report.output_path.clone()),
            status: PackagingStatus::Packaged,
            report: Some(report),
        }
    }

    fn nothing_to_package() -> Self {
        Self {
            message: NOTHING_TO_PACKAGE.to_string(),
            output_path: None,
            status: PackagingStatus::NothingToPackage,
            report: None,
        }
    }

    fn failed(err: &PackError) -> Self {
        Self {
            message: format!("Packaging failed: {err}"),
            output_path: None,
            status: PackagingStatus::Failed,
            report: None,
        }
    }

    /// Returns `true` unless the run failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status != PackagingStatus::Failed
    }
}

/// Runs packaging with a fixed [`PackConfig`].
///
/// # Examples
///
/// ```no_run
/// use projpack_core::PackConfig;
/// use projpack_core::Packager;
/// use std::path::Path;
///
/// let packager = Packager::new(PackConfig::default().with_output_dir("./dist"));
/// let result = packager.run_packaging(Path::new("./project"), &[".py"], &["__pycache__"]);
/// println!("{}", result.message);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Packager {
    config: PackConfig,
}

impl Packager {
    /// Creates a packager.
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Packages the files under `project_path` matching `extensions`,
    /// skipping `exclude_dirs`.
    pub fn run_packaging<S, P>(
        &self,
        project_path: &Path,
        extensions: &[S],
        exclude_dirs: &[P],
    ) -> PackagingResult
    where
        S: AsRef<str>,
        P: AsRef<Path>,
    {
        self.run_packaging_with_progress(project_path, extensions, exclude_dirs, &mut NoopProgress)
    }

    /// Packages like [`run_packaging`](Self::run_packaging), reporting archive
    /// progress.
    pub fn run_packaging_with_progress<S, P>(
        &self,
        project_path: &Path,
        extensions: &[S],
        exclude_dirs: &[P],
        progress: &mut dyn ProgressCallback,
    ) -> PackagingResult
    where
        S: AsRef<str>,
        P: AsRef<Path>,
    {
        info!(project = %project_path.display(), "packaging started");

        match self.package(project_path, extensions, exclude_dirs, progress) {
            Ok(Some((report, listing))) => {
                info!(
                    output = %report.output_path.display(),
                    entries = report.total_entries(),
                    "packaging finished"
                );
                PackagingResult::packaged(report, &listing)
            }
            Ok(None) => {
                warn!(project = %project_path.display(), "no files matched");
                PackagingResult::nothing_to_package()
            }
            Err(e) => {
                error!(project = %project_path.display(), error = %e, "packaging failed");
                PackagingResult::failed(&e)
            }
        }
    }

    /// Packages a saved project.
    pub fn run(&self, spec: &ProjectSpec) -> PackagingResult {
        self.run_packaging(&spec.project_path, &spec.file_extensions, &spec.exclude_dirs)
    }

    /// Packages a saved project on the blocking thread pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(&self, spec: ProjectSpec) -> PackagingTask {
        self.spawn_with_progress(spec, Box::new(NoopProgress))
    }

    /// Packages a saved project on the blocking thread pool, reporting
    /// archive progress.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_with_progress(
        &self,
        spec: ProjectSpec,
        mut progress: Box<dyn ProgressCallback>,
    ) -> PackagingTask {
        let packager = self.clone();
        let handle = tokio::task::spawn_blocking(move || {
            packager.run_packaging_with_progress(
                &spec.project_path,
                &spec.file_extensions,
                &spec.exclude_dirs,
                progress.as_mut(),
            )
        });
        PackagingTask { handle }
    }

    fn package<S, P>(
        &self,
        project_path: &Path,
        extensions: &[S],
        exclude_dirs: &[P],
        progress: &mut dyn ProgressCallback,
    ) -> Result<Option<(ArchiveReport, String)>>
    where
        S: AsRef<str>,
        P: AsRef<Path>,
    {
        let files = gather_files(project_path, extensions, exclude_dirs)?;
        if files.is_empty() {
            return Ok(None);
        }

        let report =
            archive::package_files_with_progress(project_path, files.as_slice(), &self.config, progress)?;
        let listing = tree::render_tree(files.as_slice(), project_path)?;
        Ok(Some((report, listing)))
    }
}

/// Handle to a packaging run on the blocking thread pool.
///
/// Dropping the handle detaches the run; it still completes.
#[derive(Debug)]
pub struct PackagingTask {
    handle: JoinHandle<PackagingResult>,
}

impl PackagingTask {
    /// Waits for the run to finish.
    ///
    /// A run that panicked or was cancelled yields a failed result.
    pub async fn wait(self) -> PackagingResult {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                let err = PackError::TaskFailed {
                    reason: e.to_string(),
                };
                error!(error = %err, "packaging task did not complete");
                PackagingResult::failed(&err)
            }
        }
    }
}

/// Packages a project with the default [`PackConfig`].
///
/// The archive goes to the system temporary directory.
pub fn run_packaging<S, P>(project_path: &Path, extensions: &[S], exclude_dirs: &[P]) -> PackagingResult
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    Packager::default().run_packaging(project_path, extensions, exclude_dirs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> (TempDir, PathBuf, Packager) {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");
        fs::create_dir_all(project.join("src/sub")).unwrap();
        fs::write(project.join("src/a.py"), "a").unwrap();
        fs::write(project.join("src/sub/b.py"), "b").unwrap();
        fs::write(project.join("README.md"), "r").unwrap();
        let packager = Packager::new(PackConfig::default().with_output_dir(temp.path().join("out")));
        (temp, project, packager)
    }

    #[test]
    fn test_run_packaging_success() {
        let (temp, project, packager) = sample();
        let result = packager.run_packaging(&project, &[".py"], &[] as &[&str]);

        let expected_path = temp.path().join("out/proj.tar.gz");
        assert_eq!(result.status, PackagingStatus::Packaged);
        assert_eq!(result.output_path.as_deref(), Some(expected_path.as_path()));
        assert_eq!(
            result.message,
            format!(
                "Archive created at: {}\nPackaged files:\n└── src\n    ├── a.py\n    └── sub\n        └── b.py",
                expected_path.display()
            )
        );
        assert!(expected_path.exists());

        let report = result.report.unwrap();
        assert_eq!(report.output_path, expected_path);
        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_read, 2);
        assert_eq!(
            report.bytes_written,
            fs::metadata(&expected_path).unwrap().len()
        );
    }

    #[test]
    fn test_run_packaging_nothing_to_package() {
        let (temp, project, packager) = sample();
        let result = packager.run_packaging(&project, &[".rs"], &[] as &[&str]);

        assert_eq!(result.status, PackagingStatus::NothingToPackage);
        assert_eq!(result.message, "no files to package");
        assert!(result.output_path.is_none());
        assert!(result.report.is_none());
        assert!(result.is_success());
        assert!(!temp.path().join("out/proj.tar.gz").exists());
    }

    #[test]
    fn test_run_packaging_failure_is_a_value() {
        let (temp, _project, packager) = sample();
        let result = packager.run_packaging(&temp.path().join("missing"), &[".py"], &[] as &[&str]);

        assert_eq!(result.status, PackagingStatus::Failed);
        assert!(result.message.starts_with("Packaging failed: "));
        assert!(result.message.contains("not found"));
        assert!(result.output_path.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_run_packaging_archive_write_failure() {
        let (temp, project, _) = sample();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let packager = Packager::new(PackConfig::default().with_output_dir(&blocker));

        let result = packager.run_packaging(&project, &[".py"], &[] as &[&str]);

        assert_eq!(result.status, PackagingStatus::Failed);
        assert!(result.message.starts_with("Packaging failed: "));
        assert!(result.message.contains("blocker"));
        assert!(result.output_path.is_none());
        assert!(result.report.is_none());
        assert!(fs::metadata(&blocker).unwrap().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_packaging_unreadable_source_fails() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, project, packager) = sample();
        let locked = project.join("src/a.py");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Root can still read the file.
        if fs::File::open(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }

        let result = packager.run_packaging(&project, &[".py"], &[] as &[&str]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(result.status, PackagingStatus::Failed);
        assert!(result.message.starts_with("Packaging failed: "));
        assert!(result.message.contains("a.py"));
        assert!(result.output_path.is_none());
        assert!(temp.path().join("out").exists());
    }

    #[test]
    fn test_run_saved_project() {
        let (_temp, project, packager) = sample();
        let spec = ProjectSpec::new(&project, [".py"], ["src/sub"]);
        let result = packager.run(&spec);
        assert!(result.message.ends_with("Packaged files:\n└── src\n    └── a.py"));
    }

    #[tokio::test]
    async fn test_spawn_and_wait() {
        let (_temp, project, packager) = sample();
        let spec = ProjectSpec::new(&project, [".md"], Vec::<PathBuf>::new());

        let result = packager.spawn(spec).wait().await;
        assert_eq!(result.status, PackagingStatus::Packaged);
        assert!(result.message.ends_with("└── README.md"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let value = serde_json::to_value(PackagingStatus::NothingToPackage).unwrap();
        assert_eq!(value, "nothing_to_package");
    }
}
