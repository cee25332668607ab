//! dirsizer - concurrent directory size calculator.
//!
//! Usage:
//!   dirsizer PATH...                 Total size of up to three directories
//!   dirsizer PATH --timeout 5        Stop scheduling new work after 5 seconds
//!   dirsizer PATH --format json      Machine-readable summary
//!   dirsizer --help                  Show help

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use dirsizer_core::units::{bytes_to_gb, bytes_to_mb};
use dirsizer_scan::{
    CancellationToken, DirSizer, GatherReport, LogPolicy, ProgressCounter, SizerConfig,
};

/// Most directories accepted in one run.
const MAX_ROOTS: usize = 3;

#[derive(Parser)]
#[command(
    name = "dirsizer",
    version,
    about = "Compute the total size of directories",
    long_about = "dirsizer sums the sizes of every file below up to three directories, \
                  walking subdirectories in parallel.\n\n\
                  Unreadable entries are skipped and symbolic links to directories are \
                  never followed, so the total can undercount but never double counts."
)]
struct Cli {
    /// Directories to size (at most three)
    #[arg(required = true, num_args = 1..=MAX_ROOTS)]
    paths: Vec<PathBuf>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Stop scheduling new directories after this many seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Count every hard link to a file separately
    #[arg(long)]
    count_hardlinks: bool,

    /// Print running byte count while scanning
    #[arg(short, long)]
    progress: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Log skipped entries
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON view of a run.
#[derive(Serialize)]
struct Summary {
    total_bytes: u64,
    truncated: bool,
    roots: Vec<RootSummary>,
}

#[derive(Serialize)]
struct RootSummary {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(run(cli))
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dirsizer=debug,dirsizer_scan=debug,dirsizer_core=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dirsizer=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = SizerConfig::builder()
        .threads(cli.threads)
        .count_hardlinks_once(!cli.count_hardlinks)
        .build()
        .context("Invalid options")?;
    let sizer = DirSizer::with_config(config)?;

    for path in &cli.paths {
        eprintln!("Calculating total size of: {}", path.display());
    }

    let cancel = CancellationToken::new();
    if let Some(secs) = cli.timeout {
        let deadline = Duration::try_from_secs_f64(secs).context("Invalid timeout")?;
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            tracing::info!("timeout reached, finishing directories already in progress");
            cancel.cancel();
        });
    }

    let progress = Arc::new(ProgressCounter::new());
    let ticker = cli.progress.then(|| spawn_progress_ticker(Arc::clone(&progress)));

    let gather = sizer
        .compute_total(cli.paths.clone(), cancel, progress.clone(), Arc::new(LogPolicy))
        .await;

    if let Some(ticker) = ticker {
        ticker.abort();
        eprintln!();
    }

    match cli.format {
        OutputFormat::Text => print_text(&gather),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summarize(&gather))?);
        }
    }

    Ok(())
}

/// Periodically print the running byte count to stderr.
fn spawn_progress_ticker(progress: Arc<ProgressCounter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            eprint!("\rScanned {:>12}", format_size(progress.bytes()));
        }
    })
}

fn print_text(gather: &GatherReport) {
    println!();
    println!("{}", "─".repeat(60));
    for outcome in &gather.roots {
        match &outcome.result {
            Ok(report) => {
                let marker = if report.is_truncated() { " (partial)" } else { "" };
                println!(
                    " {:<40} {:>12}{}",
                    outcome.path.display(),
                    format_size(report.total_bytes),
                    marker
                );
                if report.failures > 0 {
                    println!("   {} entries could not be read", report.failures);
                }
            }
            Err(err) => println!(" {:<40} error: {}", outcome.path.display(), err),
        }
    }
    println!("{}", "─".repeat(60));

    let total = gather.total_bytes();
    println!("{} bytes", format_number(total));
    println!("{:.2} MB", bytes_to_mb(total));
    println!("{:.2} GB", bytes_to_gb(total));
    println!("({})", format_size(total));

    if gather.is_truncated() {
        println!();
        println!("Timed out: the total is an approximation (a lower bound).");
    }
    if gather.has_failures() {
        println!();
        println!("Some directories could not be sized; the total covers the rest.");
    }
}

fn summarize(gather: &GatherReport) -> Summary {
    let roots = gather
        .roots
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(report) => RootSummary {
                path: outcome.path.clone(),
                total_bytes: Some(report.total_bytes),
                files: Some(report.files),
                skipped_entries: Some(report.failures),
                error: None,
            },
            Err(err) => RootSummary {
                path: outcome.path.clone(),
                total_bytes: None,
                files: None,
                skipped_entries: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    Summary {
        total_bytes: gather.total_bytes(),
        truncated: gather.is_truncated(),
        roots,
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format a count with thousands separators.
fn format_number(n: u64) -> String {
    let digits: Vec<u8> = n.to_string().bytes().rev().collect();
    let groups: Vec<String> = digits
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect())
        .collect();
    groups.into_iter().rev().collect::<Vec<_>>().join(",")
}
