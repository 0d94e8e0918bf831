//! TensorDB command-line interface.
//!
//! ```bash
//! # Start an interactive session over ./tensordb-data
//! tensordb
//!
//! # Use another store and execute a single query
//! tensordb -d /var/lib/tensordb -c "LIST TENSORS"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser as ClapParser;
use tensordb_common::StoreConfig;
use tensordb_query::Executor;
use tensordb_storage::Storage;
use tracing_subscriber::EnvFilter;

mod repl;

use repl::Repl;

/// TensorDB command-line interface.
#[derive(ClapParser, Debug)]
#[command(
    name = "tensordb",
    version,
    about = "An embedded tensor database for inference-time data serving"
)]
struct Args {
    /// Data directory of the store.
    #[arg(short = 'd', long, default_value = "./tensordb-data", env = "TENSORDB_DATA_DIR")]
    data_dir: PathBuf,

    /// Execute a single query and exit.
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Enable verbose output.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the banner.
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let storage = Storage::open(StoreConfig::with_data_dir(&args.data_dir))?;
    let executor = Arc::new(Executor::new(Arc::new(storage)));

    if let Some(query) = &args.command {
        let mut repl = Repl::new(executor)?;
        return repl.execute_and_print(query).await;
    }

    let mut repl = Repl::new(executor)?;
    if !args.quiet {
        repl.print_banner(&args.data_dir);
    }
    repl.run().await
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tensordb=debug")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
