//! Pack command implementation.

use crate::cli::PackArgs;
use crate::commands::project_key;
use crate::commands::resolve_spec;
use crate::error::add_project_context;
use crate::error::add_store_context;
use crate::open::open_directory;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use projpack_core::NoopProgress;
use projpack_core::PackConfig;
use projpack_core::Packager;
use projpack_core::PackagingResult;
use projpack_core::PackagingStatus;
use projpack_core::ProgressCallback;
use projpack_core::ProjectSpec;
use projpack_core::ProjectStore;
use tracing::info;

pub fn execute(
    args: &PackArgs,
    store: &ProjectStore,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let project_path = project_key(&args.path)?;
    let saved = add_store_context(store.find(&project_path), store.path())?;
    let spec = resolve_spec(project_path, &args.selection, saved.as_ref())?;

    if spec.file_extensions.is_empty() {
        formatter.format_warning("No file extensions given; pass -e EXT or save them with --save");
    }

    let config = pack_config(args);
    add_project_context(config.validate(), &spec.project_path)?;

    if args.save {
        add_store_context(store.save(spec.clone()), store.path())?;
        info!(project = %spec.project_path.display(), store = %store.path().display(), "saved project");
    }

    // Progress bar only on a terminal, and never with --quiet or --json
    let progress: Box<dyn ProgressCallback> = if show_progress && CliProgress::should_show() {
        Box::new(CliProgress::new("Packaging"))
    } else {
        Box::new(NoopProgress)
    };

    let result = run_in_background(Packager::new(config), spec, progress)?;
    if result.status == PackagingStatus::Failed {
        bail!("{}", result.message);
    }

    formatter.format_packaging_result(&result, args.save)?;

    if args.open
        && let Some(archive) = &result.output_path
    {
        let dir = archive.parent().unwrap_or(archive);
        if let Err(e) = open_directory(dir) {
            formatter.format_warning(&format!("Could not open {}: {e:#}", dir.display()));
        }
    }

    Ok(())
}

fn pack_config(args: &PackArgs) -> PackConfig {
    let mut config = PackConfig::default()
        .with_preserve_permissions(!args.no_preserve_permissions)
        .with_follow_symlinks(args.follow_symlinks);
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(level) = args.compression_level {
        config = config.with_compression_level(level);
    }
    config
}

/// Runs the packaging on a blocking worker and waits for its single result.
fn run_in_background(
    packager: Packager,
    spec: ProjectSpec,
    progress: Box<dyn ProgressCallback>,
) -> Result<PackagingResult> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start background runtime")?;

    Ok(runtime.block_on(async move { packager.spawn_with_progress(spec, progress).wait().await }))
}
