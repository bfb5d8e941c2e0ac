/// BQRS command-line tool: inspect, decode and validate `.bqrs` result
/// files.
///
/// # Command overview
///
/// ```text
/// bqrs <COMMAND> [OPTIONS]
///
/// Commands:
///   info       Print the header and every table's schema and byte region
///   decode     Print the rows of one or all tables as text or JSON
///   validate   Decode every table and report each one's status
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder activity to stderr (same as RUST_LOG=debug)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                           |
/// |------|---------------------------------------------------|
/// | 0    | Success                                           |
/// | 1    | Error (I/O failure, invalid file, failed table)   |
///
/// Diagnostics and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_info;
mod cmd_validate;
mod json;
mod text;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The BQRS (binary query result set) command-line tool.
#[derive(Parser)]
#[command(name = "bqrs", version, about = "Binary query result set CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder activity (container open, table walk) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the header and a summary of every table.
    Info(InfoArgs),
    /// Print table rows as text or JSON.
    Decode(DecodeArgs),
    /// Decode every table and report per-table success or failure.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `bqrs info`.
///
/// Reads only the header and the table schemas; no rows are decoded.
#[derive(clap::Args)]
pub struct InfoArgs {
    /// Path to the `.bqrs` file.
    pub file: PathBuf,
}

/// Output format for `bqrs decode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One tab-separated line per row, under a header line per table.
    Text,
    /// A JSON array with one object per table.
    Json,
}

/// Arguments for `bqrs decode`.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────┐
/// │ Flag         │ Effect                                        │
/// ├──────────────┼───────────────────────────────────────────────┤
/// │ --table NAME │ Decode only the table called NAME             │
/// │ --format F   │ text (default) | json                         │
/// │ --limit N    │ At most N rows per table                      │
/// └──────────────┴───────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the `.bqrs` file.
    pub file: PathBuf,

    /// Decode only this table (for example `#select`).
    #[arg(long)]
    pub table: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum number of rows to print per table.
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Arguments for `bqrs validate`.
///
/// Every table is decoded on its own stream, so one corrupt table does not
/// stop the others from being checked.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the `.bqrs` file.
    pub file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start the async runtime")?;

    runtime.block_on(async move {
        match command {
            Commands::Info(args) => cmd_info::run(&args).await,
            Commands::Decode(args) => cmd_decode::run(&args).await,
            Commands::Validate(args) => cmd_validate::run(&args).await,
        }
    })
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
