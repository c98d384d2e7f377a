//! tickbars CLI - builds OHLCV bar series at many granularities from tick files.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tickbars_lib::prelude::*;
use tickbars_lib::{DEFAULT_BATCH_SIZE, DEFAULT_PRICE_SCALE};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::build::BuildArgs;
use display::Format;

#[derive(Parser)]
#[command(name = "tickbars")]
#[command(about = "Streaming tick-to-OHLCV aggregation for futures tick files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress and summary output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a tick file into one bar series per timeframe
    Build {
        /// Tick CSV file named like NQ_2024_03.csv
        file: PathBuf,

        /// File name to derive the contract from, if the path does not follow the pattern
        #[arg(long)]
        name: Option<String>,

        /// Drop ticks priced below this value
        #[arg(long)]
        min_price: Option<f64>,

        /// Drop ticks priced above this value
        #[arg(long)]
        max_price: Option<f64>,

        /// Timeframe label to write (repeatable). Defaults to every label.
        #[arg(short, long = "timeframe")]
        timeframes: Vec<String>,

        /// JSON object of label to "<N>s" rule, replacing the default menu
        #[arg(long)]
        timeframes_json: Option<PathBuf>,

        /// Rows read per batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Multiplier from fixed-point price units to prices
        #[arg(long, default_value_t = DEFAULT_PRICE_SCALE)]
        price_scale: f64,

        /// Handling of ticks behind a timeframe's watermark (drop, reject)
        #[arg(long, default_value = "drop")]
        late: LatePolicy,

        /// Output directory. Files named <ROOT>_<label>.<format>
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// List the timeframe menu
    Rules {
        /// JSON object of label to "<N>s" rule to list instead of the default menu
        #[arg(long)]
        timeframes_json: Option<PathBuf>,
    },

    /// Show the instrument, month and contract derived from a file name
    Info {
        /// File name such as NQ_2024_03.csv
        file_name: String,
    },
}

/// Installs the log subscriber; `RUST_LOG` takes precedence over `-v`/`-q`.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Build {
            file,
            name,
            min_price,
            max_price,
            timeframes,
            timeframes_json,
            batch_size,
            price_scale,
            late,
            output_dir,
            format,
        } => {
            let args = BuildArgs {
                file,
                name,
                bounds: PriceBounds::new(min_price, max_price),
                timeframes,
                timeframes_json,
                batch_size,
                price_scale,
                late_policy: late,
                output_dir,
                format,
            };
            commands::build::build(args, cli.quiet).await
        }
        Commands::Rules { timeframes_json } => {
            commands::rules::list_rules(timeframes_json.as_deref())
        }
        Commands::Info { file_name } => commands::info::show_info(&file_name),
    }
}
