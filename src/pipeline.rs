use crate::{
    config::Config,
    error::{Error, Result},
    scanner::Scanner,
    writer::Writer,
};
use serde::Serialize;
use std::fs;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Statistics collected during a consolidation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    /// Files the traversal reached
    pub files_seen: usize,

    /// Files written to the output artifact
    pub files_consolidated: usize,

    /// Files skipped by policy, size, or encoding
    pub files_skipped: usize,

    /// Non-fatal errors tolerated during the run
    pub errors: usize,

    /// Bytes written to the output file
    pub bytes_written: u64,

    /// Total execution time
    pub duration: Duration,

    /// Output file path
    pub output_path: String,

    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RunStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Consolidation Summary                    ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files seen:           {:>8}                        ║",
            self.files_seen
        );
        println!(
            "║ Files consolidated:   {:>8}                        ║",
            self.files_consolidated
        );
        println!(
            "║ Files skipped:        {:>8}                        ║",
            self.files_skipped
        );
        println!(
            "║ Errors (tolerated):   {:>8}                        ║",
            self.errors
        );
        println!(
            "║ Bytes written:        {:>8}                        ║",
            self.bytes_written
        );
        println!(
            "║ Duration:             {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("║ Output:                                               ║");
        println!("║   {}                                                  ║", self.output_path);
        if self.dry_run {
            println!("║                                                       ║");
            println!("║ ⚠ No files were written (dry run mode)               ║");
        }
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Orchestrates a consolidation run: scan, then write.
pub struct Consolidator {
    config: Config,
}

impl Consolidator {
    /// Creates a new consolidator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Executes the consolidation run and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Prepare**: output preconditions are checked and the header
    ///    is written before any scanning work, so a bad destination
    ///    fails fast.
    /// 2. **Scan**: the tree is walked once, filtered, and decoded.
    /// 3. **Write**: one section per qualifying file, in traversal
    ///    order. A per-section failure is logged and tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error on precondition failures or a fatal output
    /// error (open, header, flush). Per-file failures never abort the
    /// run.
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<RunStats> {
        let start = Instant::now();

        info!("Starting consolidation of {}", self.config.root_dir.display());

        let source_dir =
            fs::canonicalize(&self.config.root_dir).map_err(|e| Error::io(&self.config.root_dir, e))?;

        let mut writer = if self.config.dry_run {
            warn!("Dry run mode enabled - no output will be written");
            None
        } else {
            let mut writer = Writer::create(&self.config.output_path)?;
            writer.write_header(&source_dir)?;
            Some(writer)
        };

        info!("Stage 1/2: Scanning {}", source_dir.display());
        let scanner = Scanner::new(&self.config)?;
        let (files, scan_stats) = scanner.scan()?;

        info!(
            "✓ Scanned {} files, {} qualified",
            scan_stats.files_seen,
            files.len()
        );

        info!("Stage 2/2: Writing {} sections", files.len());
        let mut errors = scan_stats.errors;
        let mut files_consolidated = 0;

        match writer.as_mut() {
            Some(writer) => {
                for file in &files {
                    match writer.write_section(file) {
                        Ok(()) => files_consolidated += 1,
                        Err(e) => {
                            error!("Failed to write section for {}: {e}", file.relative_path);
                            errors += 1;
                        }
                    }
                }
            }
            None => {
                for file in &files {
                    info!("[dry run] would consolidate {}", file.relative_path);
                }
            }
        }

        let bytes_written = match writer {
            Some(writer) => writer.finish()?,
            None => 0,
        };

        let duration = start.elapsed();
        info!(
            "✓ Consolidation completed in {:.2}s ({} files, {} bytes)",
            duration.as_secs_f64(),
            files_consolidated,
            bytes_written
        );

        Ok(RunStats {
            files_seen: scan_stats.files_seen,
            files_consolidated,
            files_skipped: scan_stats.files_skipped,
            errors,
            bytes_written,
            duration,
            output_path: self.config.output_path.display().to_string(),
            dry_run: self.config.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn config_for(root: &Path, output: &Path) -> Config {
        Config::builder()
            .root_dir(root)
            .output_path(output)
            .build()
            .unwrap()
    }

    fn run(config: Config) -> RunStats {
        Consolidator::new(config).unwrap().run().unwrap()
    }

    #[test]
    fn test_basic_consolidation() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x=1").unwrap();
        temp.child("b.py").write_str("y=2").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));

        assert_eq!(stats.files_consolidated, 2);
        assert_eq!(stats.errors, 0);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("===== File: a.py ====="));
        assert!(content.contains("x=1"));
        assert!(content.contains("===== File: b.py ====="));
        assert!(content.contains("y=2"));
    }

    #[test]
    fn test_scenario_hidden_and_excluded() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x=1").unwrap();
        temp.child(".hidden.py").write_str("y=2").unwrap();
        temp.child("node_modules/lib.py").write_str("z=3").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));

        assert_eq!(stats.files_consolidated, 1);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("===== File: a.py ====="));
        assert!(content.contains("x=1"));
        assert!(!content.contains("y=2"));
        assert!(!content.contains("z=3"));
        assert!(!content.contains(".hidden.py"));
        assert!(!content.contains("lib.py"));
    }

    #[test]
    fn test_scenario_output_dir_not_descended() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x=1").unwrap();
        temp.child("out/stale.py").write_str("stale=1").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));

        assert_eq!(stats.files_consolidated, 1);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(!content.contains("stale=1"));
        assert!(!content.contains("consolidated.txt"));
    }

    #[test]
    fn test_output_file_in_root_not_self_read() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("hello").unwrap();
        // Output sits inside the scan root with an included extension
        let output = temp.path().join("consolidated.txt");

        run(config_for(temp.path(), &output));
        let first = std::fs::read_to_string(&output).unwrap();

        // Second run must not fold the first run's output into itself
        run(config_for(temp.path(), &output));
        let second = std::fs::read_to_string(&output).unwrap();

        assert!(!second.contains("===== File: consolidated.txt ====="));
        assert_eq!(
            strip_timestamp(&first),
            strip_timestamp(&second),
            "runs over an unchanged tree must match except the timestamp"
        );
    }

    #[test]
    fn test_idempotent_except_timestamp() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/main.rs").write_str("fn main() {}").unwrap();
        temp.child("README.md").write_str("# Readme\n").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        run(config_for(temp.path(), &output));
        let first = std::fs::read_to_string(&output).unwrap();

        run(config_for(temp.path(), &output));
        let second = std::fs::read_to_string(&output).unwrap();

        assert_eq!(strip_timestamp(&first), strip_timestamp(&second));
    }

    fn strip_timestamp(content: &str) -> String {
        content
            .lines()
            .filter(|l| !l.starts_with("# Generated at: "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_zero_qualifying_files_is_success() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("image.jpg").write_str("not really").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));

        assert_eq!(stats.files_consolidated, 0);
        assert!(output.exists());

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("# Source directory: "));
        assert!(!content.contains("===== File:"));
    }

    #[test]
    fn test_empty_file_gets_section() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("empty.py").touch().unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));

        assert_eq!(stats.files_consolidated, 1);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("===== File: empty.py ====="));
    }

    #[test]
    fn test_content_round_trip() {
        let temp = assert_fs::TempDir::new().unwrap();
        let body = "def f():\n\treturn 'naïve'\n\n\nprint(f())\n";
        temp.child("code.py").write_str(body).unwrap();
        let output = temp.path().join("out/consolidated.txt");

        run(config_for(temp.path(), &output));

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains(body));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x=1").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .dry_run(true)
            .build()
            .unwrap();
        let stats = run(config);

        assert!(stats.dry_run);
        assert_eq!(stats.bytes_written, 0);
        assert_eq!(stats.files_consolidated, 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_oversized_file_absent_from_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("small.py").write_str("ok=1").unwrap();
        temp.child("big.py").write_str("x = '0123456789abcdef'").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .max_file_size(10)
            .build()
            .unwrap();
        let stats = run(config);

        assert_eq!(stats.files_consolidated, 1);
        assert_eq!(stats.files_skipped, 1);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("small.py"));
        assert!(!content.contains("big.py"));
    }

    #[test]
    fn test_stats_serialize() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("x=1").unwrap();
        let output = temp.path().join("out/consolidated.txt");

        let stats = run(config_for(temp.path(), &output));
        let json = serde_json::to_string(&stats).unwrap();

        assert!(json.contains("\"files_consolidated\":1"));
        assert!(json.contains("\"dry_run\":false"));
    }

    #[test]
    fn test_invalid_root_rejected() {
        let config = Config {
            root_dir: "/nonexistent/path".into(),
            ..Config::default()
        };

        assert!(Consolidator::new(config).is_err());
    }
}
