use crate::content::SourceFile;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes the consolidated output artifact.
///
/// One buffered handle is held open for the duration of the run.
/// Writing is append-only and sequential; the artifact is a header
/// block followed by one section per consolidated file.
pub(crate) struct Writer {
    output_path: PathBuf,
    out: BufWriter<File>,
    bytes_written: u64,
}

impl Writer {
    /// Opens the output file, creating its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Failures here are fatal to the run: the parent directory cannot
    /// be created, or the file cannot be created. A permission failure
    /// surfaces as [`Error::OutputUnwritable`].
    pub(crate) fn create(output_path: &Path) -> Result<Self> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let file = File::create(output_path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => Error::output_unwritable(output_path, e),
            _ => Error::io(output_path, e),
        })?;

        debug!("Opened output file {}", output_path.display());

        Ok(Self {
            output_path: output_path.to_path_buf(),
            out: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    /// Writes the header block: source directory, generator identity,
    /// timestamp, then a blank line.
    pub(crate) fn write_header(&mut self, source_dir: &Path) -> Result<()> {
        let header = format!(
            "# Source directory: {}\n# Generated by: textfold v{}\n# Generated at: {}\n\n",
            source_dir.display(),
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
        self.write_all(&header)
    }

    /// Writes one file section: delimiter line with the relative path,
    /// a blank line, the raw content, then a blank separator line.
    ///
    /// Content bytes appear verbatim; a newline is appended only when
    /// non-empty content does not already end with one.
    pub(crate) fn write_section(&mut self, file: &SourceFile) -> Result<()> {
        let mut section =
            String::with_capacity(file.content.len() + file.relative_path.len() + 32);
        section.push_str("===== File: ");
        section.push_str(&file.relative_path);
        section.push_str(" =====\n\n");
        section.push_str(&file.content);
        if !file.content.is_empty() && !file.content.ends_with('\n') {
            section.push('\n');
        }
        section.push('\n');

        self.write_all(&section)?;
        debug!("Wrote section for {}", file.relative_path);
        Ok(())
    }

    /// Flushes and finalizes the output, returning bytes written.
    ///
    /// # Errors
    ///
    /// A flush failure is fatal.
    pub(crate) fn finish(mut self) -> Result<u64> {
        self.out
            .flush()
            .map_err(|e| Error::io(&self.output_path, e))?;

        info!(
            "Finalized {} ({} bytes)",
            self.output_path.display(),
            self.bytes_written
        );
        Ok(self.bytes_written)
    }

    fn write_all(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| Error::io(&self.output_path, e))?;
        self.bytes_written += text.len() as u64;
        Ok(())
    }
}
