//! Saved project records.

use crate::PackError;
use crate::Result;
use crate::filters;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// A project directory together with its packaging selection.
///
/// This is the record stored by [`ProjectStore`](crate::ProjectStore).
/// Records are stored as written; call [`validate`](Self::validate) before
/// packaging one.
///
/// # Examples
///
/// ```
/// use projpack_core::ProjectSpec;
///
/// let json = r#"{
///     "project_path": "/home/me/tool",
///     "file_extensions": [".py", ".md"],
///     "exclude_dirs": ["__pycache__"]
/// }"#;
/// let spec: ProjectSpec = serde_json::from_str(json)?;
/// assert_eq!(spec.file_extensions, [".py", ".md"]);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Root directory of the project.
    pub project_path: PathBuf,

    /// File name suffixes to include, such as `.py`.
    #[serde(default)]
    pub file_extensions: Vec<String>,

    /// Directories relative to `project_path` that are not descended.
    #[serde(default)]
    pub exclude_dirs: Vec<PathBuf>,
}

impl ProjectSpec {
    /// Creates a record.
    pub fn new<I, S, J, P>(project_path: impl Into<PathBuf>, file_extensions: I, exclude_dirs: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            project_path: project_path.into(),
            file_extensions: file_extensions.into_iter().map(Into::into).collect(),
            exclude_dirs: exclude_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Placeholder record written into a fresh configuration file.
    #[must_use]
    pub fn template() -> Self {
        Self::new("change_project_path_here", [".py"], ["__pycache__"])
    }

    /// Normalizes extensions in place and drops duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidExtension`] for a blank extension.
    pub fn normalize_extensions(&mut self) -> Result<()> {
        let mut normalized: Vec<String> = Vec::with_capacity(self.file_extensions.len());
        for raw in &self.file_extensions {
            let ext = filters::normalize_extension(raw).ok_or_else(|| {
                PackError::InvalidExtension {
                    extension: raw.clone(),
                }
            })?;
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        self.file_extensions = normalized;
        Ok(())
    }

    /// Checks that the record can be packaged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `project_path` does not exist or is not a directory
    /// - An extension is blank
    /// - An exclusion is not a relative path naming an existing subdirectory
    pub fn validate(&self) -> Result<()> {
        let root: &Path = &self.project_path;
        if !root.exists() {
            return Err(PackError::ProjectNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(PackError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        if let Some(blank) = self
            .file_extensions
            .iter()
            .find(|raw| filters::normalize_extension(raw).is_none())
        {
            return Err(PackError::InvalidExtension {
                extension: blank.clone(),
            });
        }

        for exclude in &self.exclude_dirs {
            filters::validate_exclude_dir(exclude, root)?;
        }
        Ok(())
    }
}
