//! Saved project management.

use crate::cli::ProjectsCommand;
use crate::commands::project_key;
use crate::commands::resolve_spec;
use crate::error::add_store_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use projpack_core::ProjectStore;

pub fn execute(
    command: &ProjectsCommand,
    store: &ProjectStore,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let store_path = store.path();

    match command {
        ProjectsCommand::List => {
            let projects = add_store_context(store.list_projects(), store_path)?;
            formatter.format_projects(&projects)
        }
        ProjectsCommand::Add { path, selection } => {
            let spec = resolve_spec(project_key(path)?, selection, None)?;
            let message = format!("Saved project {}", spec.project_path.display());
            add_store_context(store.save(spec), store_path)?;
            formatter.format_success("projects", &message);
            Ok(())
        }
        ProjectsCommand::Remove { path } => {
            let key = project_key(path)?;
            let mut removed = add_store_context(store.delete(&key), store_path)?;
            if !removed && key != *path {
                removed = add_store_context(store.delete(path), store_path)?;
            }

            if removed {
                formatter.format_success("projects", &format!("Removed project {}", key.display()));
            } else {
                formatter.format_warning(&format!("No saved project for {}", key.display()));
            }
            Ok(())
        }
        ProjectsCommand::Export { dest } => {
            add_store_context(store.export(dest), store_path)?;
            formatter.format_success(
                "projects",
                &format!("Exported saved projects to {}", dest.display()),
            );
            Ok(())
        }
        ProjectsCommand::Init { force } => {
            if add_store_context(store.init(*force), store_path)? {
                formatter.format_success("projects", &format!("Created {}", store_path.display()));
            } else {
                formatter.format_warning(&format!(
                    "{} already exists; use --force to overwrite it",
                    store_path.display()
                ));
            }
            Ok(())
        }
    }
}
