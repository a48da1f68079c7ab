use crate::error::{Error, Result};
use globset::Glob;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Size ceiling for a single input file (50 MiB).
const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Extensions included by default (lowercase, no leading dot).
static DEFAULT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "py", "rs", "js", "ts", "jsx", "tsx", "go", "java", "kt", "c", "cpp", "h", "hpp", "cs",
        "rb", "php", "lua", "md", "txt", "rst", "toml", "json", "yaml", "yml", "ini", "cfg",
        "conf", "html", "css", "scss", "xml", "svg", "sh", "bash", "sql",
    ]
    .into_iter()
    .collect()
});

/// Exact file names included by default (matched case-insensitively).
static DEFAULT_FILENAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "dockerfile",
        "makefile",
        "license",
        ".gitignore",
        ".dockerignore",
        ".editorconfig",
        ".env",
    ]
    .into_iter()
    .collect()
});

/// Directory names pruned from traversal by default (case-sensitive).
static DEFAULT_EXCLUDED_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "node_modules",
        "target",
        "__pycache__",
        "venv",
        "dist",
        "build",
        "vendor",
        "coverage",
        ".git",
        ".idea",
        ".vscode",
        ".venv",
    ]
    .into_iter()
    .collect()
});

/// Configuration for a consolidation run.
///
/// Use [`Config::builder()`] to construct a new configuration. The
/// configuration is immutable for the duration of a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Directory the traversal starts from
    pub root_dir: PathBuf,

    /// Path of the consolidated output file
    pub output_path: PathBuf,

    /// Included extensions, lowercase without leading dot
    pub included_extensions: HashSet<String>,

    /// Included exact file names, lowercase
    pub included_filenames: HashSet<String>,

    /// Directory names pruned from traversal, case-sensitive
    pub excluded_dirs: HashSet<String>,

    /// Extra glob patterns excluding files and directories
    pub exclude_patterns: Vec<String>,

    /// Absolute paths excluded from consolidation. The output file is
    /// always excluded regardless of this list.
    pub exclude_paths: Vec<PathBuf>,

    /// Skip entries whose name starts with the hidden marker
    pub skip_hidden: bool,

    /// Size ceiling in bytes for a single input file
    pub max_file_size: u64,

    /// Follow symbolic links during traversal
    pub follow_links: bool,

    /// Scan and log without writing the output file
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use textfold::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Derives the default output path for a scan root:
    /// `consolidated_<dirname>.txt` in the root's parent directory.
    pub(crate) fn default_output_path(root: &Path) -> PathBuf {
        let dir_name = root
            .file_name()
            .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().to_string());

        root.parent()
            .unwrap_or(root)
            .join(format!("consolidated_{dir_name}.txt"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The scan root doesn't exist or is not a directory
    /// - The size ceiling is zero
    /// - An exclude pattern is not a valid glob
    /// - The output path points at the scan root
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.is_dir() {
            return Err(Error::root_not_found(&self.root_dir));
        }

        if self.max_file_size == 0 {
            return Err(Error::config("max_file_size must be greater than 0"));
        }

        for pattern in &self.exclude_patterns {
            Glob::new(pattern)
                .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;
        }

        let root = fs::canonicalize(&self.root_dir).map_err(|e| Error::io(&self.root_dir, e))?;
        if let Ok(output) = fs::canonicalize(&self.output_path) {
            if output == root {
                return Err(Error::config(format!(
                    "Output path must not be the scan root: {}",
                    self.output_path.display()
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_path: PathBuf::from("consolidated_root.txt"),
            included_extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            included_filenames: DEFAULT_FILENAMES.iter().map(|s| (*s).to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            exclude_patterns: Vec::new(),
            exclude_paths: Vec::new(),
            skip_hidden: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            follow_links: false,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    extra_extensions: Vec<String>,
    extra_filenames: Vec<String>,
    extra_excluded_dirs: Vec<String>,
    exclude_patterns: Vec<String>,
    exclude_paths: Vec<PathBuf>,
    include_hidden: bool,
    max_file_size: Option<u64>,
    follow_links: bool,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the scan root directory.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the output file path.
    ///
    /// When not set, the output defaults to `consolidated_<dirname>.txt`
    /// in the scan root's parent directory.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Adds extensions to the included set. Entries are normalized to
    /// lowercase and a leading dot is stripped.
    #[must_use]
    pub fn include_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Adds exact file names to the included set.
    #[must_use]
    pub fn include_filenames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_filenames.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds directory names to the excluded set.
    #[must_use]
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_excluded_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds glob patterns excluding files and directories.
    #[must_use]
    pub fn exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds absolute paths to exclude from consolidation.
    #[must_use]
    pub fn exclude_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Includes hidden files and directories in the scan.
    #[must_use]
    pub fn include_hidden(mut self, enabled: bool) -> Self {
        self.include_hidden = enabled;
        self
    }

    /// Sets the size ceiling in bytes for a single input file.
    #[must_use]
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Enables following symbolic links during traversal.
    #[must_use]
    pub fn follow_links(mut self, enabled: bool) -> Self {
        self.follow_links = enabled;
        self
    }

    /// Enables dry run mode (scan and log, write nothing).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let mut config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            ..Config::default()
        };

        config
            .included_extensions
            .extend(self.extra_extensions.iter().map(|e| normalize_extension(e)));
        config
            .included_filenames
            .extend(self.extra_filenames.iter().map(|n| n.to_lowercase()));
        config.excluded_dirs.extend(self.extra_excluded_dirs);
        config.exclude_patterns = self.exclude_patterns;
        config.exclude_paths = self.exclude_paths;
        config.skip_hidden = !self.include_hidden;
        config.max_file_size = self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE);
        config.follow_links = self.follow_links;
        config.dry_run = self.dry_run;

        if !config.root_dir.is_dir() {
            return Err(Error::root_not_found(&config.root_dir));
        }

        config.output_path = match self.output_path {
            Some(path) => path,
            None => {
                let root =
                    fs::canonicalize(&config.root_dir).map_err(|e| Error::io(&config.root_dir, e))?;
                Config::default_output_path(&root)
            }
        };

        config.validate()?;
        Ok(config)
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
