use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use textfold::{Config, Consolidator};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "textfold",
    version,
    author,
    about = "Fold a directory tree of text files into one annotated file",
    long_about = "Recursively scans a directory, filters files by extension and name, \
    and concatenates their text content into a single labeled output file.\n\n\
    Hidden entries and common dependency/build directories are skipped by default. \
    Each included file appears as one section carrying its path relative to the scan root.\n\n\
    USAGE EXAMPLES:\n  \
      # Consolidate the current directory\n  \
      textfold\n\n  \
      # Consolidate a project into a chosen file\n  \
      textfold ./my-project --out ./my-project.txt\n\n  \
      # Add extensions and exclude a directory\n  \
      textfold --ext log --ext csv --exclude-dir fixtures\n\n  \
      # See what would be consolidated without writing\n  \
      textfold --dry-run -v"
)]
struct Cli {
    /// Root directory to scan
    #[arg(default_value = ".", value_name = "DIR")]
    dir: PathBuf,

    /// Output file path
    ///
    /// Defaults to consolidated_<dirname>.txt in the scan root's
    /// parent directory.
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Additional file extension to include (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Additional exact file name to include (repeatable)
    #[arg(long = "include-name", value_name = "NAME")]
    include_names: Vec<String>,

    /// Additional directory name to exclude (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    exclude_dirs: Vec<String>,

    /// Glob pattern excluding files and directories (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude_patterns: Vec<String>,

    /// Path to exclude from consolidation (repeatable)
    ///
    /// Use this to keep specific files out of the output, e.g. the
    /// sources of a tool that generates files under the scan root.
    #[arg(long = "exclude-path", value_name = "PATH")]
    exclude_paths: Vec<PathBuf>,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Size ceiling in bytes for a single input file
    #[arg(long, default_value_t = 50 * 1024 * 1024, value_name = "BYTES")]
    max_file_size: u64,

    /// Follow symbolic links during traversal
    #[arg(long)]
    follow_links: bool,

    /// Scan and log without writing the output file
    #[arg(long)]
    dry_run: bool,

    /// Print run statistics as JSON to stdout
    #[arg(long)]
    json_summary: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = Config::builder()
        .root_dir(cli.dir)
        .include_extensions(cli.extensions)
        .include_filenames(cli.include_names)
        .exclude_dirs(cli.exclude_dirs)
        .exclude_patterns(cli.exclude_patterns)
        .exclude_paths(cli.exclude_paths)
        .include_hidden(cli.include_hidden)
        .max_file_size(cli.max_file_size)
        .follow_links(cli.follow_links)
        .dry_run(cli.dry_run);

    if let Some(out) = cli.out {
        builder = builder.output_path(out);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Consolidator::new(config)
        .context("Failed to create consolidator")?
        .run()
        .context("Consolidation failed")?;

    if cli.json_summary {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print_summary();
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("textfold=info"),
        1 => EnvFilter::new("textfold=debug"),
        _ => EnvFilter::new("textfold=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}
