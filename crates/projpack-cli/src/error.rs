//! Error conversion utilities for CLI.
//!
//! Converts projpack-core's typed errors (thiserror) into user-facing
//! errors (anyhow) with actionable hints.

use anyhow::anyhow;
use projpack_core::PackError;
use std::path::Path;

/// Converts a `PackError` raised for `project` into an error with a hint.
pub fn convert_pack_error(err: PackError, project: &Path) -> anyhow::Error {
    if !err.is_configuration_error() {
        return convert_run_error(err, project);
    }

    match err {
        PackError::ProjectNotFound { path } => {
            anyhow!(
                "Project directory not found: {}\n\
                 HINT: Check the path, or run `projpack projects list` to see saved projects.",
                path.display()
            )
        }
        PackError::NotADirectory { path } => {
            anyhow!(
                "Project path is not a directory: {}\n\
                 HINT: Pass the project's root directory, not a file inside it.",
                path.display()
            )
        }
        PackError::InvalidExclusion { exclude, reason } => {
            anyhow!(
                "Invalid exclusion '{}' for project '{}': {}\n\
                 HINT: Exclusions are existing directories relative to the project root, e.g. -x __pycache__",
                exclude.display(),
                project.display(),
                reason
            )
        }
        PackError::InvalidExtension { extension } => {
            anyhow!(
                "Invalid file extension {extension:?}\n\
                 HINT: Pass extensions like -e .py or -e py"
            )
        }
        PackError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level: {level}\n\
                 HINT: Use a level between 1 (fastest) and 9 (smallest)."
            )
        }
        _ => convert_run_error(err, project),
    }
}

/// Errors raised by the filesystem while packaging. Points at the failing
/// path when there is one.
fn convert_run_error(err: PackError, project: &Path) -> anyhow::Error {
    let mut context = format!("Error packaging project '{}'", project.display());
    if let Some(path) = err.path() {
        context.push_str(&format!(
            "\nHINT: Check that '{}' exists and is readable.",
            path.display()
        ));
    }
    anyhow::Error::from(err).context(context)
}

/// Converts a `PackError` raised while using the saved projects file.
pub fn convert_store_error(err: PackError, store: &Path) -> anyhow::Error {
    match err {
        PackError::Json(json_err) => {
            anyhow!(
                "Saved projects file '{}' is not valid: {}\n\
                 HINT: Fix the file by hand or recreate it with `projpack projects init --force`.",
                store.display(),
                json_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error accessing saved projects '{}'", store.display())),
    }
}

/// Adds project context to a core result.
pub fn add_project_context<T>(
    result: Result<T, PackError>,
    project: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_pack_error(e, project))
}

/// Adds saved projects file context to a core result.
pub fn add_store_context<T>(result: Result<T, PackError>, store: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_store_error(e, store))
}
