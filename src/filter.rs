//! Inclusion and exclusion policy.
//!
//! Directory pruning and file selection are decided here; the scanner
//! consults the filter before descending so pruned directories are
//! never visited.

use crate::config::Config;
use crate::content::is_hidden_name;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub(crate) struct ScanFilter {
    included_extensions: HashSet<String>,
    included_filenames: HashSet<String>,
    excluded_dirs: HashSet<String>,
    exclude_globs: GlobSet,
    excluded_paths: Vec<PathBuf>,
    output_parent: Option<PathBuf>,
    skip_hidden: bool,
}

impl ScanFilter {
    /// Creates a new filter from the run configuration.
    ///
    /// The output file and its parent directory are resolved here so
    /// the traversal can refuse to read the tool's own output.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let exclude_globs = build_globset(&config.exclude_patterns)?;

        let mut excluded_paths: Vec<PathBuf> = config
            .exclude_paths
            .iter()
            .map(|p| resolve(p))
            .collect();
        excluded_paths.push(resolve(&config.output_path));

        let output_parent = config.output_path.parent().map(resolve);

        Ok(Self {
            included_extensions: config.included_extensions.clone(),
            included_filenames: config.included_filenames.clone(),
            excluded_dirs: config.excluded_dirs.clone(),
            exclude_globs,
            excluded_paths,
            output_parent,
            skip_hidden: config.skip_hidden,
        })
    }

    /// Decides whether the traversal may descend into a directory.
    pub(crate) fn should_descend(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return true;
        };
        let name = name.to_string_lossy();

        if self.excluded_dirs.contains(name.as_ref()) {
            return false;
        }

        if self.skip_hidden && name.starts_with('.') {
            return false;
        }

        if self.exclude_globs.is_match(path) {
            return false;
        }

        if let Some(parent) = &self.output_parent {
            if &resolve(path) == parent {
                return false;
            }
        }

        true
    }

    /// Decides whether a file qualifies for consolidation.
    ///
    /// Hidden-exclusion takes precedence over the included sets unless
    /// hidden entries are enabled.
    pub(crate) fn should_include(&self, path: &Path) -> bool {
        if self.skip_hidden && is_hidden_name(path) {
            return false;
        }

        let resolved = resolve(path);
        if self.excluded_paths.contains(&resolved) {
            return false;
        }

        if self.exclude_globs.is_match(path) {
            return false;
        }

        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();

        if self.included_filenames.contains(&name) {
            return true;
        }

        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.included_extensions.contains(&ext))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))
}

/// Canonicalizes a path where possible. Paths that do not exist yet
/// (the output file before the first write) fall back to a plain
/// absolute form so equality checks still work.
fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
