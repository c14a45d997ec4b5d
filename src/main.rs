//! Command-line driver: runs the counting race once and prints the tally.
//!
//! ```text
//! race-counter [THREADS] [LOOPS] [--protection none|mutex|spin] [--unprotected]
//! ```
//!
//! Without arguments it starts 2 threads doing 10 million increments each
//! under a mutex. `--unprotected` drops the guard so lost updates show up in
//! the total.

use std::process::ExitCode;

use clap::Parser;
use race_counter::{run, Protection};
use tracing::error;

const DEFAULT_THREADS: i64 = 2;
const DEFAULT_LOOPS: i64 = 10 * 1000 * 1000;

#[derive(Parser, Debug)]
#[command(name = "race-counter")]
#[command(about = "Concurrent counter increments with and without a guard", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Number of worker threads
    #[arg(default_value_t = DEFAULT_THREADS)]
    threads: i64,

    /// Increments performed by each thread
    #[arg(default_value_t = DEFAULT_LOOPS)]
    loops: i64,

    /// How each increment is synchronized
    #[arg(short, long, value_enum, default_value_t = Protection::Mutex)]
    protection: Protection,

    /// Shorthand for `--protection none`
    #[arg(short, long, conflicts_with = "protection")]
    unprotected: bool,

    /// Log spawn and per-worker progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        "race_counter=debug,info"
    } else {
        "race_counter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let protection = if args.unprotected {
        Protection::Unprotected
    } else {
        args.protection
    };

    match run(args.threads, args.loops, protection) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_config() => {
            error!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
