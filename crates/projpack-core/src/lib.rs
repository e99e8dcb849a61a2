//! Filtered project packaging into gzip-compressed tar archives.
//!
//! `projpack-core` walks a project directory, keeps the files whose names end
//! with one of the requested extensions, skips excluded subdirectories, writes
//! the selection to `{project}.tar.gz` and renders a tree listing of what was
//! stored.
//!
//! # Examples
//!
//! ```no_run
//! use projpack_core::PackConfig;
//! use projpack_core::Packager;
//! use projpack_core::PackagingStatus;
//! use std::path::Path;
//!
//! let packager = Packager::new(PackConfig::default());
//! let result = packager.run_packaging(Path::new("./project"), &[".py"], &["__pycache__"]);
//!
//! if result.status == PackagingStatus::Packaged {
//!     println!("{}", result.message);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod error;
pub mod filters;
pub mod packager;
pub mod project;
pub mod report;
pub mod store;
pub mod tree;
pub mod walker;

// Re-export main API types
pub use archive::package_files;
pub use config::PackConfig;
pub use error::PackError;
pub use error::Result;
pub use packager::Packager;
pub use packager::PackagingResult;
pub use packager::PackagingStatus;
pub use packager::PackagingTask;
pub use packager::run_packaging;
pub use project::ProjectSpec;
pub use report::ArchiveReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use store::ProjectStore;
pub use tree::FileTree;
pub use tree::render_tree;
pub use walker::FileList;
pub use walker::FileWalker;
pub use walker::gather_files;
