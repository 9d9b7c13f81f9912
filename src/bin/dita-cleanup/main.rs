//! dita-cleanup CLI tool
//!
//! Rewrites a DITA corpus in place so that cross-references, identifiers, placeholders, and
//! image paths work across files.
//!
//! Settings come from `dita-cleanup.toml` in the corpus directory (or `--config`), with the
//! flags below taking precedence. Diagnostics go to the log on stderr; `--json` additionally
//! prints the full run report to stdout.
//!
//! **Warning**: without `--dry-run` modified files are overwritten in place. Run it on a
//! checkout under version control.
use clap::Parser;
use dita_cleanup::{CleanupConfig, CleanupError, CorpusCompiler, CorpusReport};
use std::{path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(name = "dita-cleanup")]
#[command(author, version, about = "Make DITA cross-references and identifiers portable across files", long_about = None)]
struct Cli {
    /// Corpus directory or single document (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Configuration file path (default: dita-cleanup.toml in the corpus directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Turn `{name}` placeholders into `<ph conref="PREFIX/name"/>`
    #[arg(long, value_name = "PREFIX")]
    conref_prefix: Option<String>,
    /// Re-root image references at this directory
    #[arg(long, value_name = "DIR")]
    images_dir: Option<PathBuf>,
    /// Report what would change without writing any file
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<CorpusReport, CleanupError> {
    let mut config = CleanupConfig::load(&cli.path, cli.config.as_deref())?;
    if let Some(prefix) = cli.conref_prefix {
        config.conref_prefix = Some(prefix);
    }
    if let Some(images_dir) = cli.images_dir {
        config.images_dir = Some(images_dir);
    }

    let compiler = CorpusCompiler::new(&cli.path, config, !cli.dry_run)?;
    let report = compiler.run()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let dry_run = cli.dry_run;
    match run(cli) {
        Ok(report) => {
            if dry_run {
                tracing::info!("Dry run: {} documents would be modified", report.modified());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("dita-cleanup: {e}");
            ExitCode::FAILURE
        }
    }
}
