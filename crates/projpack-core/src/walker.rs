//! Project tree walking with extension and exclusion filtering.

use crate::PackError;
use crate::Result;
use crate::filters;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::warn;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// Ordered list of absolute file paths selected for packaging.
///
/// Paths appear in traversal order: depth-first, with the entries of each
/// directory in the order the operating system reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList(Vec<PathBuf>);

impl FileList {
    /// Creates a list from already selected paths.
    #[must_use]
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self(files)
    }

    /// Returns the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no file was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the paths in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    /// Returns the paths as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    /// Consumes the list, returning the paths.
    #[must_use]
    pub fn into_inner(self) -> Vec<PathBuf> {
        self.0
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FileList {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<PathBuf>> for FileList {
    fn from(files: Vec<PathBuf>) -> Self {
        Self(files)
    }
}

impl AsRef<[PathBuf]> for FileList {
    fn as_ref(&self) -> &[PathBuf] {
        &self.0
    }
}

/// Walks a project directory and collects files to package.
///
/// Directories whose path equals an exclusion are not descended. Files are
/// kept when their name ends with one of the extensions. Symlinks are never
/// followed: a link to a directory is skipped, any other link is a file
/// candidate.
///
/// # Examples
///
/// ```no_run
/// use projpack_core::walker::FileWalker;
///
/// let files = FileWalker::new("./project")
///     .with_extensions([".py"])
///     .with_exclude_dirs(["__pycache__"])
///     .gather()?;
///
/// for file in &files {
///     println!("{}", file.display());
/// }
/// # Ok::<(), projpack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_dirs: Vec<PathBuf>,
}

impl FileWalker {
    /// Creates a walker for `root` with no extensions and no exclusions.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }

    /// Sets the extensions a file name must end with.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the directories, relative to the root, that are not descended.
    #[must_use]
    pub fn with_exclude_dirs<I, P>(mut self, exclude_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_dirs = exclude_dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Walks the tree and returns the selected files.
    ///
    /// Unreadable directories are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::ProjectNotFound`] if the root does not exist and
    /// [`PackError::NotADirectory`] if it is not a directory.
    pub fn gather(&self) -> Result<FileList> {
        let root = filters::absolutize(&self.root)?;
        check_project_dir(&root)?;

        let excluded = filters::resolve_exclusions(&root, &self.exclude_dirs);
        if !filters::should_descend(&root, &excluded) {
            debug!(path = %root.display(), "project root is excluded");
            return Ok(FileList::default());
        }

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                let keep = !entry.file_type().is_dir()
                    || filters::should_descend(entry.path(), &excluded);
                if !keep {
                    debug!(path = %entry.path().display(), "pruned excluded directory");
                }
                keep
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::display);
                    if let Some(path) = path {
                        warn!(path = %path, error = %e, "skipping unreadable entry");
                    } else {
                        warn!(error = %e, "skipping unreadable entry");
                    }
                    continue;
                }
            };

            if self.is_candidate(&entry) {
                files.push(entry.into_path());
            }
        }

        debug!(
            root = %root.display(),
            files = files.len(),
            "walk finished"
        );
        Ok(FileList(files))
    }

    fn is_candidate(&self, entry: &DirEntry) -> bool {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            return false;
        }
        if file_type.is_symlink() && points_to_dir(entry.path()) {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        filters::matches_extension(&name, &self.extensions)
    }
}

/// Collects the files under `project_path` matching `extensions`, skipping
/// the directories in `exclude_dirs`.
///
/// Shorthand for [`FileWalker`].
///
/// # Errors
///
/// See [`FileWalker::gather`].
pub fn gather_files<S, P>(project_path: &Path, extensions: &[S], exclude_dirs: &[P]) -> Result<FileList>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    FileWalker::new(project_path)
        .with_extensions(extensions.iter().map(|ext| ext.as_ref().to_string()))
        .with_exclude_dirs(exclude_dirs.iter().map(|dir| dir.as_ref().to_path_buf()))
        .gather()
}

fn check_project_dir(root: &Path) -> Result<()> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PackError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PackError::ProjectNotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(PackError::file_access(root, e)),
    }
}

fn points_to_dir(link: &Path) -> bool {
    std::fs::metadata(link).is_ok_and(|target| target.is_dir())
}
