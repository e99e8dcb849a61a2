//! Path filtering rules for project packaging.
//!
//! Two independent rules decide what ends up in an archive:
//!
//! - a directory is descended into unless its absolute path is one of the
//!   resolved exclusion paths ([`should_descend`]);
//! - a file is collected if its lowercased name ends with one of the requested
//!   extensions ([`matches_extension`]).
//!
//! Exclusions are exact directory paths, not patterns. An exclusion that names
//! no existing directory never matches anything.

use crate::PackError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Returns `false` iff `dir` equals one of the absolute exclusion paths.
///
/// Comparison is `Path` equality: component-wise and case-sensitive. A
/// trailing separator does not change a path, but no prefix or glob matching
/// takes place, so excluding `src` prunes `src` itself and, by not descending
/// into it, everything below it.
///
/// # Examples
///
/// ```
/// use projpack_core::filters::should_descend;
/// use std::path::{Path, PathBuf};
///
/// let excluded = [PathBuf::from("/project/target")];
/// assert!(!should_descend(Path::new("/project/target"), &excluded));
/// assert!(should_descend(Path::new("/project/target2"), &excluded));
/// assert!(should_descend(Path::new("/project/src"), &excluded));
/// ```
#[must_use]
pub fn should_descend<P: AsRef<Path>>(dir: &Path, exclude_dirs_abs: &[P]) -> bool {
    !exclude_dirs_abs.iter().any(|excluded| excluded.as_ref() == dir)
}

/// Returns `true` iff the lowercased `filename` ends with one of `extensions`.
///
/// Extensions are compared lowercased as well. This is a plain suffix test on
/// the whole name, so `notes.py.bak` does not match `.py`.
///
/// # Examples
///
/// ```
/// use projpack_core::filters::matches_extension;
///
/// let extensions = [".py".to_string(), ".md".to_string()];
/// assert!(matches_extension("main.py", &extensions));
/// assert!(matches_extension("README.MD", &extensions));
/// assert!(!matches_extension("main.py.bak", &extensions));
/// ```
#[must_use]
pub fn matches_extension<S: AsRef<str>>(filename: &str, extensions: &[S]) -> bool {
    let name = filename.to_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&ext.as_ref().to_lowercase()))
}

/// Joins every exclusion onto the project root.
///
/// The result is what [`should_descend`] compares directory paths against.
#[must_use]
pub fn resolve_exclusions<P: AsRef<Path>>(project_path: &Path, exclude_dirs: &[P]) -> Vec<PathBuf> {
    exclude_dirs
        .iter()
        .map(|exclude| project_path.join(exclude))
        .collect()
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem. Symlinks are not resolved.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| PackError::file_access(path, e))
}

/// Normalizes a user-entered extension.
///
/// Surrounding whitespace is trimmed, the result is lowercased and a missing
/// leading `.` is added. Returns `None` for blank input.
///
/// # Examples
///
/// ```
/// use projpack_core::filters::normalize_extension;
///
/// assert_eq!(normalize_extension(" PY "), Some(".py".to_string()));
/// assert_eq!(normalize_extension(".tar.gz"), Some(".tar.gz".to_string()));
/// assert_eq!(normalize_extension("   "), None);
/// ```
#[must_use]
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}

/// Validates an exclusion directory against a project root.
///
/// The exclusion must be a relative path without `..`, root or drive
/// components, and must resolve to an existing directory under the root.
/// Returns the absolute exclusion path.
///
/// # Errors
///
/// Returns [`PackError::InvalidExclusion`] describing the first rule broken.
pub fn validate_exclude_dir(exclude_dir: &Path, project_path: &Path) -> Result<PathBuf> {
    let reject = |reason: &str| PackError::InvalidExclusion {
        exclude: exclude_dir.to_path_buf(),
        reason: reason.to_string(),
    };

    for component in exclude_dir.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(reject("parent directory components are not allowed"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(reject("must be relative to the project directory"));
            }
        }
    }

    let full_path = project_path.join(exclude_dir);
    if !full_path.is_dir() {
        return Err(reject(&format!(
            "{} is not an existing directory",
            full_path.display()
        )));
    }

    Ok(full_path)
}
