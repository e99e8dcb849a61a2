//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "projpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Saved projects file
    #[arg(long, global = true, env = "PROJPACK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Package a project directory into a tar.gz archive
    Pack(PackArgs),
    /// Manage saved projects
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Project directory to package
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Directory to write the archive to (default: system temp directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Store symlink targets instead of the links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Store files with mode 0644 and no owner
    #[arg(long)]
    pub no_preserve_permissions: bool,

    /// Save the selection for this project
    #[arg(long)]
    pub save: bool,

    /// Open the output directory after packaging
    #[arg(long)]
    pub open: bool,
}

/// File selection shared by `pack` and `projects add`.
#[derive(clap::Args)]
pub struct SelectionArgs {
    /// File extension to include (can be repeated)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory to exclude, relative to the project (can be repeated)
    #[arg(short = 'x', long = "exclude", value_name = "DIR")]
    pub exclude_dirs: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum ProjectsCommand {
    /// List saved projects
    List,
    /// Save a project selection
    Add {
        /// Project directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Remove a saved project
    Remove {
        /// Project directory
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Write saved projects to a file
    Export {
        /// Destination file
        #[arg(value_name = "DEST")]
        dest: PathBuf,
    },
    /// Create the saved projects file with a template entry
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
