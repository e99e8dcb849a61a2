//! Gzip-compressed TAR archive writing.
//!
//! One archive per run, named after the project directory and written into
//! the configured output directory. An existing archive of the same name is
//! overwritten.

use crate::PackConfig;
use crate::PackError;
use crate::ProgressCallback;
use crate::Result;
use crate::config::compression_level_to_flate2;
use crate::filters;
use crate::report::ArchiveReport;
use crate::report::NoopProgress;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tar::Builder;
use tar::Header;
use tracing::debug;
use tracing::info;

/// Extension appended to the project name.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Name used when the project path has no final component.
const FALLBACK_NAME: &str = "archive";

/// Default mode for entries when permissions are not preserved.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Writes `files` into `{output_dir}/{project name}.tar.gz`.
///
/// Each file is stored under its path relative to `project_path`, in list
/// order. The output directory is created if needed.
///
/// # Examples
///
/// ```no_run
/// use projpack_core::PackConfig;
/// use projpack_core::archive::package_files;
/// use projpack_core::walker::gather_files;
/// use std::path::Path;
///
/// let project = Path::new("./project");
/// let files = gather_files(project, &[".py"], &["__pycache__"])?;
/// let config = PackConfig::default().with_output_dir("./dist");
/// let report = package_files(project, files.as_slice(), &config)?;
/// println!("wrote {}", report.output_path.display());
/// # Ok::<(), projpack_core::PackError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - A file is not under `project_path`
/// - Any file cannot be read or the archive cannot be written
pub fn package_files<P: AsRef<Path>>(
    project_path: &Path,
    files: &[P],
    config: &PackConfig,
) -> Result<ArchiveReport> {
    package_files_with_progress(project_path, files, config, &mut NoopProgress)
}

/// Writes the archive like [`package_files`], reporting progress.
///
/// `progress` receives one start and one complete event per entry, batched
/// byte counts while file content is read, and a final completion event.
///
/// # Errors
///
/// See [`package_files`].
pub fn package_files_with_progress<P: AsRef<Path>>(
    project_path: &Path,
    files: &[P],
    config: &PackConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ArchiveReport> {
    config.validate()?;

    let root = filters::absolutize(project_path)?;
    let entries = files
        .iter()
        .map(|file| archive_entry(&root, file.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| PackError::file_access(&config.output_dir, e))?;
    let output_path = config.output_dir.join(archive_file_name(&root));

    let start = Instant::now();
    let mut report = ArchiveReport::new(&output_path);

    let file = File::create(&output_path).map_err(|e| PackError::file_access(&output_path, e))?;
    // flate2 writes a zero mtime into the gzip header, keeping output stable.
    let encoder = flate2::write::GzEncoder::new(
        CountingWriter::new(file),
        compression_level_to_flate2(config.compression_level),
    );
    let mut builder = Builder::new(encoder);

    let mut events = EntryProgress::new(progress, entries.len());
    for entry in &entries {
        events.start(&entry.name);
        append_entry(&mut builder, entry, config, &mut report, events.callback)?;
        events.finish(&entry.name);
    }

    let encoder = builder.into_inner()?;
    let mut counting_writer = encoder.finish()?;
    counting_writer.flush()?;

    report.bytes_written = counting_writer.total_bytes();
    report.duration = start.elapsed();
    events.done();

    info!(
        output = %output_path.display(),
        files = report.files_added,
        symlinks = report.symlinks_added,
        bytes = report.bytes_written,
        "archive written"
    );
    Ok(report)
}

/// Returns the archive file name for a project directory.
///
/// The name is the last component of the path plus `.tar.gz`. Paths without
/// a last component (such as `/` or `..`) are canonicalized first. If that
/// still gives no name, `archive.tar.gz` is used.
///
/// # Examples
///
/// ```
/// use projpack_core::archive::archive_file_name;
/// use std::path::Path;
///
/// assert_eq!(archive_file_name(Path::new("/home/me/demo")), "demo.tar.gz");
/// assert_eq!(archive_file_name(Path::new("/home/me/demo/")), "demo.tar.gz");
/// ```
#[must_use]
pub fn archive_file_name(project_path: &Path) -> String {
    let name = project_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            project_path
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|name| name.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    format!("{name}{ARCHIVE_EXTENSION}")
}

/// A file paired with the name it gets inside the archive.
struct ArchiveEntry {
    path: PathBuf,
    name: PathBuf,
}

fn archive_entry(root: &Path, file: &Path) -> Result<ArchiveEntry> {
    let path = filters::absolutize(file)?;
    let name = path
        .strip_prefix(root)
        .map_err(|_| PackError::OutsideProject {
            path: path.clone(),
            root: root.to_path_buf(),
        })?
        .to_path_buf();

    if name.as_os_str().is_empty() {
        return Err(PackError::OutsideProject {
            path,
            root: root.to_path_buf(),
        });
    }

    Ok(ArchiveEntry { path, name })
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    config: &PackConfig,
    report: &mut ArchiveReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let link_metadata =
        std::fs::symlink_metadata(&entry.path).map_err(|e| PackError::file_access(&entry.path, e))?;

    if link_metadata.file_type().is_symlink() && !config.follow_symlinks {
        let target =
            std::fs::read_link(&entry.path).map_err(|e| PackError::file_access(&entry.path, e))?;
        let mut header = Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        set_metadata(&mut header, &link_metadata, config);

        builder.append_link(&mut header, &entry.name, &target)?;
        report.symlinks_added += 1;
        debug!(entry = %entry.name.display(), target = %target.display(), "stored symlink");
        return Ok(());
    }

    let file = File::open(&entry.path).map_err(|e| PackError::file_access(&entry.path, e))?;
    let metadata = file
        .metadata()
        .map_err(|e| PackError::file_access(&entry.path, e))?;
    let size = metadata.len();

    let mut header = Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(size);
    set_metadata(&mut header, &metadata, config);

    let mut tracked = BatchedProgressReader::new(file.take(size), progress);
    builder.append_data(&mut header, &entry.name, &mut tracked)?;

    report.files_added += 1;
    report.bytes_read += size;
    debug!(entry = %entry.name.display(), size, "stored file");
    Ok(())
}

/// Fills mode, owner and mtime from `metadata`.
///
/// Without `preserve_permissions` the mode is 0o644 and owner ids stay 0.
#[cfg(unix)]
fn set_metadata(header: &mut Header, metadata: &std::fs::Metadata, config: &PackConfig) {
    use std::os::unix::fs::MetadataExt;

    if config.preserve_permissions {
        header.set_mode(metadata.mode());
        header.set_uid(u64::from(metadata.uid()));
        header.set_gid(u64::from(metadata.gid()));
    } else {
        header.set_mode(DEFAULT_FILE_MODE);
    }
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_metadata(header: &mut Header, metadata: &std::fs::Metadata, config: &PackConfig) {
    let mode = if config.preserve_permissions && metadata.permissions().readonly() {
        0o444
    } else {
        DEFAULT_FILE_MODE
    };
    header.set_mode(mode);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}

/// Bytes of file content accumulated before a progress update is sent.
const PROGRESS_BATCH_BYTES: u64 = 256 * 1024;

/// Numbers entries as they are stored and forwards the events.
struct EntryProgress<'a> {
    callback: &'a mut dyn ProgressCallback,
    position: usize,
    total: usize,
}

impl<'a> EntryProgress<'a> {
    fn new(callback: &'a mut dyn ProgressCallback, total: usize) -> Self {
        Self {
            callback,
            position: 0,
            total,
        }
    }

    fn start(&mut self, name: &Path) {
        self.position += 1;
        self.callback.on_entry_start(name, self.total, self.position);
    }

    fn finish(&mut self, name: &Path) {
        self.callback.on_entry_complete(name);
    }

    fn done(self) {
        self.callback.on_complete();
    }
}

/// Reader over one entry's content that reports bytes in batches.
///
/// Whatever is still pending is reported when the reader is dropped, so
/// every entry's bytes are accounted for before its completion event.
struct BatchedProgressReader<'a, R> {
    inner: R,
    callback: &'a mut dyn ProgressCallback,
    pending: u64,
}

impl<'a, R> BatchedProgressReader<'a, R> {
    fn new(inner: R, callback: &'a mut dyn ProgressCallback) -> Self {
        Self {
            inner,
            callback,
            pending: 0,
        }
    }

    fn report_pending(&mut self) {
        if self.pending > 0 {
            self.callback.on_bytes_written(self.pending);
            self.pending = 0;
        }
    }
}

impl<R: Read> Read for BatchedProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pending += n as u64;
        if self.pending >= PROGRESS_BATCH_BYTES {
            self.report_pending();
        }
        Ok(n)
    }
}

impl<R> Drop for BatchedProgressReader<'_, R> {
    fn drop(&mut self) {
        self.report_pending();
    }
}

/// Writer that counts bytes reaching the output file.
struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn read_entries(archive: &Path) -> Vec<(String, Vec<u8>)> {
        let file = File::open(archive).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().to_string_lossy().into_owned();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (name, data)
            })
            .collect()
    }

    fn setup() -> (TempDir, PathBuf, PackConfig) {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("demo");
        fs::create_dir_all(project.join("src/sub")).unwrap();
        fs::write(project.join("src/a.py"), "print('a')\n").unwrap();
        fs::write(project.join("src/sub/b.py"), "print('b')\n").unwrap();
        let config = PackConfig::default().with_output_dir(temp.path().join("out"));
        (temp, project, config)
    }

    #[test]
    fn test_package_files_relative_names() {
        let (_temp, project, config) = setup();
        let files = [project.join("src/a.py"), project.join("src/sub/b.py")];

        let report = package_files(&project, &files, &config).unwrap();
        assert_eq!(report.output_path, config.output_dir.join("demo.tar.gz"));
        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_read, 22);
        assert!(report.bytes_written > 0);

        let entries = read_entries(&report.output_path);
        assert_eq!(
            entries,
            vec![
                ("src/a.py".to_string(), b"print('a')\n".to_vec()),
                ("src/sub/b.py".to_string(), b"print('b')\n".to_vec()),
            ]
        );
    }

    #[test]
    fn test_package_files_empty_list_writes_valid_archive() {
        let (_temp, project, config) = setup();
        let files: [PathBuf; 0] = [];

        let report = package_files(&project, &files, &config).unwrap();
        assert!(read_entries(&report.output_path).is_empty());
    }

    #[test]
    fn test_package_files_overwrites_existing() {
        let (_temp, project, config) = setup();
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.output_dir.join("demo.tar.gz"), "stale").unwrap();

        let report = package_files(&project, &[project.join("src/a.py")], &config).unwrap();
        assert_eq!(read_entries(&report.output_path).len(), 1);
    }

    #[test]
    fn test_package_files_deterministic() {
        let (_temp, project, config) = setup();
        let files = [project.join("src/a.py"), project.join("src/sub/b.py")];

        let first = package_files(&project, &files, &config).unwrap();
        let first_bytes = fs::read(&first.output_path).unwrap();
        let second = package_files(&project, &files, &config).unwrap();
        let second_bytes = fs::read(&second.output_path).unwrap();

        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_package_files_outside_project() {
        let (temp, project, config) = setup();
        let stray = temp.path().join("stray.py");
        fs::write(&stray, "").unwrap();

        let err = package_files(&project, &[stray], &config).unwrap_err();
        assert!(matches!(err, PackError::OutsideProject { .. }));
        assert!(!config.output_dir.join("demo.tar.gz").exists());
    }

    #[test]
    fn test_package_files_missing_file() {
        let (_temp, project, config) = setup();
        let err = package_files(&project, &[project.join("gone.py")], &config).unwrap_err();
        assert!(matches!(err, PackError::FileAccess { .. }));
    }

    #[test]
    fn test_package_files_invalid_config() {
        let (_temp, project, config) = setup();
        let config = config.with_compression_level(0);
        let err = package_files(&project, &[project.join("src/a.py")], &config).unwrap_err();
        assert!(matches!(err, PackError::InvalidCompressionLevel { level: 0 }));
    }

    #[cfg(unix)]
    #[test]
    fn test_package_files_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, project, config) = setup();
        let script = project.join("run.py");
        fs::write(&script, "").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mode_of = |config: &PackConfig| {
            let report = package_files(&project, &[script.clone()], config).unwrap();
            let file = File::open(&report.output_path).unwrap();
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            let entry = archive.entries().unwrap().next().unwrap().unwrap();
            entry.header().mode().unwrap() & 0o777
        };

        assert_eq!(mode_of(&config), 0o755);
        assert_eq!(mode_of(&config.clone().with_preserve_permissions(false)), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_package_files_symlink_stored_as_link() {
        let (_temp, project, config) = setup();
        let link = project.join("alias.py");
        std::os::unix::fs::symlink("src/a.py", &link).unwrap();

        let report = package_files(&project, &[link.clone()], &config).unwrap();
        assert_eq!(report.symlinks_added, 1);
        assert_eq!(report.files_added, 0);

        let file = File::open(&report.output_path).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().entry_type(), tar::EntryType::Symlink);
        assert_eq!(
            entry.link_name().unwrap().unwrap().to_string_lossy(),
            "src/a.py"
        );

        let followed = package_files(&project, &[link], &config.with_follow_symlinks(true)).unwrap();
        assert_eq!(followed.files_added, 1);
        assert_eq!(
            read_entries(&followed.output_path),
            vec![("alias.py".to_string(), b"print('a')\n".to_vec())]
        );
    }

    #[test]
    fn test_package_files_reports_progress() {
        #[derive(Default)]
        struct Recorder {
            started: Vec<(String, usize, usize)>,
            bytes: u64,
            completed: usize,
        }

        impl ProgressCallback for Recorder {
            fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
                self.started
                    .push((path.to_string_lossy().into_owned(), total, current));
            }

            fn on_bytes_written(&mut self, bytes: u64) {
                self.bytes += bytes;
            }

            fn on_entry_complete(&mut self, _path: &Path) {}

            fn on_complete(&mut self) {
                self.completed += 1;
            }
        }

        let (_temp, project, config) = setup();
        let files = [project.join("src/a.py"), project.join("src/sub/b.py")];
        let mut recorder = Recorder::default();

        package_files_with_progress(&project, &files, &config, &mut recorder).unwrap();

        assert_eq!(recorder.started.len(), 2);
        assert_eq!(recorder.started[1].1, 2);
        assert_eq!(recorder.started[1].2, 2);
        assert!(recorder.started[1].0.ends_with("b.py"));
        assert_eq!(recorder.bytes, 22);
        assert_eq!(recorder.completed, 1);
    }

    #[test]
    fn test_progress_bytes_arrive_before_entry_completes() {
        #[derive(Default)]
        struct EventLog {
            events: Vec<String>,
        }

        impl ProgressCallback for EventLog {
            fn on_entry_start(&mut self, path: &Path, _total: usize, _current: usize) {
                self.events.push(format!("start {}", path.display()));
            }

            fn on_bytes_written(&mut self, bytes: u64) {
                self.events.push(format!("bytes {bytes}"));
            }

            fn on_entry_complete(&mut self, path: &Path) {
                self.events.push(format!("done {}", path.display()));
            }

            fn on_complete(&mut self) {
                self.events.push("complete".to_string());
            }
        }

        let (_temp, project, config) = setup();
        let big = project.join("big.py");
        let size = PROGRESS_BATCH_BYTES + 1000;
        fs::write(&big, vec![b'x'; usize::try_from(size).unwrap()]).unwrap();
        let mut log = EventLog::default();

        package_files_with_progress(&project, &[big], &config, &mut log).unwrap();

        let bytes: u64 = log
            .events
            .iter()
            .filter_map(|e| e.strip_prefix("bytes "))
            .map(|n| n.parse::<u64>().unwrap())
            .sum();
        assert_eq!(bytes, size);
        assert_eq!(log.events.first().unwrap(), "start big.py");
        assert_eq!(&log.events[log.events.len() - 2..], ["done big.py", "complete"]);
        assert!(log.events.iter().filter(|e| e.starts_with("bytes ")).count() >= 2);
    }

    #[test]
    fn test_archive_file_name_fallbacks() {
        assert_eq!(archive_file_name(Path::new("project")), "project.tar.gz");
        assert_eq!(archive_file_name(Path::new("/")), "archive.tar.gz");
    }
}
