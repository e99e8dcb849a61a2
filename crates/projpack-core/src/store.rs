//! JSON file of saved projects.
//!
//! The file holds one object with a `projects` array:
//!
//! ```json
//! {
//!     "projects": [
//!         {
//!             "project_path": "/home/me/tool",
//!             "file_extensions": [".py"],
//!             "exclude_dirs": ["__pycache__"]
//!         }
//!     ]
//! }
//! ```
//!
//! Every operation reads the file afresh and rewrites it whole. Concurrent
//! writers are not coordinated; the last write wins.

use crate::PackError;
use crate::ProjectSpec;
use crate::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Directory under the user config dir holding the store.
const APP_DIR: &str = "projpack";

/// File name of the store.
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    projects: Vec<ProjectSpec>,
}

impl ConfigFile {
    fn template() -> Self {
        Self {
            projects: vec![ProjectSpec::template()],
        }
    }
}

/// Persistent list of [`ProjectSpec`] records keyed by project path.
///
/// # Examples
///
/// ```no_run
/// use projpack_core::ProjectSpec;
/// use projpack_core::ProjectStore;
///
/// let store = ProjectStore::new("projects.json");
/// store.save(ProjectSpec::new("/home/me/tool", [".py"], ["__pycache__"]))?;
///
/// for project in store.list_projects()? {
///     println!("{}", project.project_path.display());
/// }
/// # Ok::<(), projpack_core::PackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file is not touched until an operation needs it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default store location: `projpack/config.json` under the
    /// user config directory, or `./config.json` if there is none.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dir| dir.join(APP_DIR).join(CONFIG_FILE),
        )
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all saved projects. A missing file holds no projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn list_projects(&self) -> Result<Vec<ProjectSpec>> {
        Ok(self.load()?.unwrap_or_default().projects)
    }

    /// Returns the project saved for `project_path`, if any.
    ///
    /// # Errors
    ///
    /// See [`list_projects`](Self::list_projects).
    pub fn find(&self, project_path: &Path) -> Result<Option<ProjectSpec>> {
        Ok(self
            .list_projects()?
            .into_iter()
            .find(|project| project.project_path == project_path))
    }

    /// Saves `project`, replacing a record with the same path in place or
    /// appending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn save(&self, project: ProjectSpec) -> Result<()> {
        let mut config = self.load()?.unwrap_or_default();

        if let Some(existing) = config
            .projects
            .iter_mut()
            .find(|existing| existing.project_path == project.project_path)
        {
            debug!(project = %project.project_path.display(), "updating saved project");
            *existing = project;
        } else {
            debug!(project = %project.project_path.display(), "adding saved project");
            config.projects.push(project);
        }

        write_config(&self.path, &config)
    }

    /// Removes every record for `project_path`.
    ///
    /// Returns `true` if a record was removed. A missing file is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn delete(&self, project_path: &Path) -> Result<bool> {
        let Some(mut config) = self.load()? else {
            return Ok(false);
        };

        let before = config.projects.len();
        config
            .projects
            .retain(|project| project.project_path != project_path);
        let removed = config.projects.len() != before;

        write_config(&self.path, &config)?;
        Ok(removed)
    }

    /// Writes the current configuration to `dest`.
    ///
    /// If no configuration file exists yet, the default template is written
    /// instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or `dest` cannot be
    /// written.
    pub fn export(&self, dest: &Path) -> Result<()> {
        let config = self.load()?.unwrap_or_else(ConfigFile::template);
        write_config(dest, &config)
    }

    /// Writes the default template to the store file.
    ///
    /// An existing file is kept unless `force` is set. Returns `true` if the
    /// file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn init(&self, force: bool) -> Result<bool> {
        if self.path.exists() && !force {
            return Ok(false);
        }
        write_config(&self.path, &ConfigFile::template())?;
        Ok(true)
    }

    fn load(&self) -> Result<Option<ConfigFile>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PackError::file_access(&self.path, e)),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Indentation of the saved projects file.
const INDENT: &[u8] = b"    ";

fn write_config(dest: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| PackError::file_access(parent, e))?;
    }

    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    config.serialize(&mut serde_json::Serializer::with_formatter(&mut json, formatter))?;
    json.push(b'\n');
    std::fs::write(dest, json).map_err(|e| PackError::file_access(dest, e))?;
    debug!(path = %dest.display(), projects = config.projects.len(), "wrote project store");
    Ok(())
}
