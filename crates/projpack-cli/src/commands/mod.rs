//! Subcommand implementations.

pub mod completion;
pub mod pack;
pub mod projects;

use crate::cli::SelectionArgs;
use crate::error::add_project_context;
use anyhow::Context;
use anyhow::Result;
use projpack_core::ProjectSpec;
use std::path::Path;
use std::path::PathBuf;

/// Returns `path` as an absolute path, the key saved projects are stored
/// under.
pub fn project_key(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("failed to resolve path '{}'", path.display()))
}

/// Builds a validated project from command-line selection flags.
///
/// Extensions and exclusions not given on the command line are taken from
/// `saved`, when present.
pub fn resolve_spec(
    project_path: PathBuf,
    selection: &SelectionArgs,
    saved: Option<&ProjectSpec>,
) -> Result<ProjectSpec> {
    let file_extensions = if selection.extensions.is_empty() {
        saved
            .map(|s| s.file_extensions.clone())
            .unwrap_or_default()
    } else {
        selection.extensions.clone()
    };
    let exclude_dirs = if selection.exclude_dirs.is_empty() {
        saved.map(|s| s.exclude_dirs.clone()).unwrap_or_default()
    } else {
        selection.exclude_dirs.clone()
    };

    let mut spec = ProjectSpec::new(project_path.clone(), file_extensions, exclude_dirs);
    add_project_context(spec.normalize_extensions(), &project_path)?;
    add_project_context(spec.validate(), &project_path)?;
    Ok(spec)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn selection(extensions: &[&str], exclude_dirs: &[&str]) -> SelectionArgs {
        SelectionArgs {
            extensions: extensions.iter().map(ToString::to_string).collect(),
            exclude_dirs: exclude_dirs.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_resolve_spec_prefers_flags() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("build")).unwrap();
        let saved = ProjectSpec::new(temp.path(), [".md"], ["build"]);

        let spec = resolve_spec(temp.path().to_path_buf(), &selection(&["PY"], &[]), Some(&saved))
            .unwrap();
        assert_eq!(spec.file_extensions, [".py"]);
        assert_eq!(spec.exclude_dirs, [PathBuf::from("build")]);
    }

    #[test]
    fn test_resolve_spec_rejects_bad_exclusion() {
        let temp = TempDir::new().unwrap();
        let err = resolve_spec(temp.path().to_path_buf(), &selection(&[".py"], &["nope"]), None)
            .unwrap_err();
        assert!(format!("{err:?}").contains("HINT"));
    }

    #[test]
    fn test_project_key_is_absolute() {
        assert!(project_key(Path::new("relative/dir")).unwrap().is_absolute());
    }
}
