use crate::{
    config::Config,
    content::{self, SourceFile},
    error::{Error, Result},
    filter::ScanFilter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScanStats {
    /// Files the traversal reached
    pub files_seen: usize,

    /// Files that qualified and decoded
    pub files_included: usize,

    /// Files skipped by policy, size, or encoding
    pub files_skipped: usize,

    /// Read and walk errors
    pub errors: usize,
}

/// Walks the scan root and collects qualifying files.
///
/// The walk is single-threaded and depth-first with entries sorted by
/// file name, so the output order is deterministic. Directories are
/// filtered before descent; pruned subtrees are never visited.
pub(crate) struct Scanner {
    root_dir: PathBuf,
    filter: ScanFilter,
    max_file_size: u64,
    follow_links: bool,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be built from the
    /// configured exclude patterns.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            root_dir: config.root_dir.clone(),
            filter: ScanFilter::new(config)?,
            max_file_size: config.max_file_size,
            follow_links: config.follow_links,
        })
    }

    /// Scans the root directory and returns qualifying files in
    /// traversal order.
    ///
    /// Per-file failures (unreadable, undecodable, oversized) are
    /// logged and counted; they never abort the scan. Zero qualifying
    /// files is a valid outcome.
    pub(crate) fn scan(&self) -> Result<(Vec<SourceFile>, ScanStats)> {
        let root = fs::canonicalize(&self.root_dir).map_err(|e| Error::io(&self.root_dir, e))?;

        let mut files = Vec::new();
        let mut stats = ScanStats::default();

        debug!("Starting scan of {}", root.display());

        let walker = WalkDir::new(&root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || self.filter.should_descend(entry.path())
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {e}");
                    stats.errors += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            stats.files_seen += 1;
            let path = entry.path();

            if !self.filter.should_include(path) {
                debug!("Skipping excluded file: {}", path.display());
                stats.files_skipped += 1;
                continue;
            }

            match self.read_file(path, &root) {
                Ok(file) => {
                    debug!(
                        "Including {} ({} bytes, {})",
                        file.relative_path,
                        file.size,
                        file.encoding.name()
                    );
                    files.push(file);
                    stats.files_included += 1;
                }
                Err(e) if e.is_per_file() => {
                    warn!("{e}");
                    stats.files_skipped += 1;
                }
                Err(e) => {
                    error!("Failed to read {}: {e}", path.display());
                    stats.errors += 1;
                }
            }
        }

        debug!(
            "Scan complete: {} seen, {} included, {} skipped, {} errors",
            stats.files_seen, stats.files_included, stats.files_skipped, stats.errors
        );

        Ok((files, stats))
    }

    /// Reads and decodes a single qualifying file.
    fn read_file(&self, path: &Path, root: &Path) -> Result<SourceFile> {
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;

        if metadata.len() > self.max_file_size {
            return Err(Error::too_large(path, metadata.len(), self.max_file_size));
        }

        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

        let (decoded, encoding) =
            content::decode_text(&bytes).ok_or_else(|| Error::undecodable(path))?;

        let relative_path = pathdiff::diff_paths(path, root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .to_string();

        Ok(SourceFile::new(
            path.to_path_buf(),
            relative_path,
            decoded,
            encoding,
            metadata.len(),
        ))
    }
}
