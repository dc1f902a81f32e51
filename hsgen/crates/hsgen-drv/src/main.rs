//! hsgen CLI - inspect a host description and simulate compilations.
//!
//! It uses clap for argument parsing and dispatches to the command
//! handlers in [`commands`].

mod commands;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{run_check, run_simulate, CheckArgs, SimulateArgs};
use hsgen_drv::{DriverError, HostConfig};

/// Exit status when the recompilation limit is hit.
const RECOMPILATION_EXIT_CODE: i32 = -1;

/// hsgen - binary-contract core of a JIT backend
#[derive(Parser, Debug)]
#[command(name = "hsgen")]
#[command(author = "hsgen Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect host descriptions and simulate backend compilations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "HSGEN_VERBOSE")]
    verbose: bool,

    /// Path to the host description (default: ./hsgen.toml)
    #[arg(short, long, global = true, env = "HSGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "HSGEN_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the hsgen CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a host description
    ///
    /// Binds every mark and barrier stub the description exports and
    /// reports what is present, missing or optional.
    Check(CheckCommand),

    /// Simulate compilations of one method
    ///
    /// Allocates lock records, records marks and dispatches barriers the
    /// way the backend does while lowering a method.
    Simulate(SimulateCommand),
}

/// Arguments for the check subcommand.
#[derive(Parser, Debug)]
struct CheckCommand {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the simulate subcommand.
#[derive(Parser, Debug)]
struct SimulateCommand {
    /// Method being compiled
    #[arg(short, long)]
    method: String,

    /// Monitor nesting depths, comma separated, in encounter order
    #[arg(short, long, value_delimiter = ',')]
    depths: Vec<u32>,

    /// Number of compilations to run
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Print summaries as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color)?;

    let result = load_config(cli.config.as_deref())
        .and_then(|config| execute_command(cli.command, config));

    if let Err(err) = &result {
        if let Some(driver_err) = err.downcast_ref::<DriverError>() {
            if driver_err.is_process_fatal() {
                tracing::error!("{}; terminating", driver_err);
                std::process::exit(RECOMPILATION_EXIT_CODE);
            }
        }
    }
    result
}

/// Initialize the logging system.
///
/// `HSGEN_LOG` takes precedence over `--verbose`. Records from the library
/// crates' `log` calls are forwarded into the same subscriber.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("HSGEN_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<HostConfig> {
    let path = HostConfig::locate(config_path);
    Ok(HostConfig::load(&path)?)
}

fn execute_command(command: Commands, config: HostConfig) -> Result<()> {
    match command {
        Commands::Check(args) => run_check(CheckArgs { json: args.json }, config),
        Commands::Simulate(args) => run_simulate(
            SimulateArgs {
                method: args.method,
                depths: args.depths,
                count: args.count,
                json: args.json,
            },
            config,
        ),
    }
}
