//! # textfold
//!
//! Fold a directory tree of text files into a single annotated output file.
//!
//! ## Features
//!
//! - Recursive scan with directory pruning before descent
//! - Inclusion by extension or exact file name, exclusion by directory
//!   name, glob pattern, or explicit path
//! - Encoding fallback (UTF-8, UTF-16, Latin-1) with binary detection
//! - One labeled section per file, in deterministic traversal order
//! - Per-file failures are logged and tolerated; the run continues
//!
//! ## Quick Start
//!
//! ```no_run
//! use textfold::{Config, Consolidator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./project")
//!     .output_path("./consolidated_project.txt")
//!     .build()?;
//!
//! let stats = Consolidator::new(config)?.run()?;
//! println!("{} files consolidated", stats.files_consolidated);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a two-stage pipeline:
//! 1. **Scanner**: walks the tree, applies the inclusion policy, and
//!    decodes qualifying files
//! 2. **Writer**: appends a header block and one section per file to
//!    the output artifact

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod content;
mod error;
mod filter;
mod pipeline;
mod scanner;
mod writer;

pub use config::{Config, ConfigBuilder};
pub use content::{SourceFile, TextEncoding, DEFAULT_ENCODINGS};
pub use error::{Error, Result};
pub use pipeline::{Consolidator, RunStats};

/// Runs a complete consolidation with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The scan root doesn't exist or is inaccessible
/// - The output file cannot be created or finalized
///
/// # Examples
///
/// ```no_run
/// use textfold::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunStats> {
    Consolidator::new(config)?.run()
}
