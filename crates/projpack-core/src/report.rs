//! Archive reporting and progress callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a single archive write.
///
/// # Examples
///
/// ```
/// use projpack_core::ArchiveReport;
///
/// let mut report = ArchiveReport::default();
/// report.files_added = 10;
/// report.bytes_read = 1024;
/// report.bytes_written = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Location of the written archive.
    pub output_path: PathBuf,

    /// Number of regular files stored.
    pub files_added: usize,

    /// Number of symlinks stored as link entries.
    pub symlinks_added: usize,

    /// Total bytes of file content read (uncompressed).
    pub bytes_read: u64,

    /// Total bytes of the final archive (compressed).
    pub bytes_written: u64,

    /// Duration of the archive write.
    pub duration: Duration,
}

impl ArchiveReport {
    /// Creates an empty report for `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Returns the number of entries stored in the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.symlinks_added
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_written == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.bytes_written as f64
    }

    /// Returns the space saved as a percentage of the uncompressed size.
    ///
    /// Can be negative for tiny inputs, where tar and gzip framing outweighs
    /// the content. Returns 0.0 if nothing was read.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_read == 0 {
            return 0.0;
        }
        (1.0 - (self.bytes_written as f64 / self.bytes_read as f64)) * 100.0
    }
}

/// Callback trait for progress reporting while an archive is written.
///
/// The trait requires `Send` so a callback can move into the background
/// packaging task.
///
/// # Examples
///
/// ```
/// use projpack_core::ProgressCallback;
/// use std::path::Path;
///
/// struct PrintProgress;
///
/// impl ProgressCallback for PrintProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is stored.
    ///
    /// # Arguments
    ///
    /// * `path` - Archive name of the entry
    /// * `total` - Total number of entries in this run
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called as file content is read into the archive, in batches.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry has been stored.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the archive is finished.
    fn on_complete(&mut self);
}

/// Progress callback that does nothing.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
