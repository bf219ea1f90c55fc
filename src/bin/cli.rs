//! sharder CLI
//!
//! Runs the four-stage pipeline for a single archive:
//!
//! ```text
//! sharder <ARCHIVE> <MEMORY> <CPUS> <SPLIT_SIZE>
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use sharder::{
    error::{EXIT_USAGE, Result},
    models::{Config, RunParams, RunSummary},
    pipeline,
    stages::CommandRunner,
};

/// Configuration read when `--config` is not given.
const DEFAULT_CONFIG: &str = "sharder.toml";

/// sharder - crawl archive to JSON-lines shards
#[derive(Parser, Debug)]
#[command(
    name = "sharder",
    version,
    about = "Index, sort, split and convert one crawl archive"
)]
struct Cli {
    /// Compressed crawl archive to process
    archive: String,

    /// Working-memory budget for sorting (e.g. 2G, 512M, 50%)
    memory: String,

    /// Number of threads the sort may use
    cpus: String,

    /// Maximum shard size in bytes (suffixes K, M, G, T allowed)
    split_size: String,

    /// Path to the TOML configuration file [default: sharder.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Exit code for a command line clap refused to parse.
fn usage_exit_code(e: &clap::Error) -> u8 {
    if e.use_stderr() { EXIT_USAGE } else { 0 }
}

/// An explicitly named config must load; the implicit one may be absent.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(DEFAULT_CONFIG)),
    }
}

/// Load configuration and validate the positional arguments.
fn prepare(cli: &Cli) -> Result<(Config, RunParams)> {
    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let params = RunParams::parse(&cli.archive, &cli.memory, &cli.cpus, &cli.split_size)?;
    log::debug!("Run parameters: {:?}", params);

    Ok((config, params))
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };
    init_logging(cli.verbose);

    log::info!("sharder starting...");

    let (config, params) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let runner = CommandRunner::new(config.tools.clone());
    let summary = match pipeline::run_pipeline(&config, &params, &runner).await {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Exiting with status {}", e.exit_code());
            return ExitCode::from(e.exit_code());
        }
    };

    if cli.json {
        if let Err(e) = print_summary(&summary) {
            log::error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    }

    log::info!("Done!");
    ExitCode::SUCCESS
}
