//! qbridge Command-Line Interface
//!
//! Converts OpenQASM 2.0 programs into target-framework operation streams
//! and runs them on IBM Q remote devices.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::parse_binding;
use commands::{convert, gates, run, version};

/// qbridge - move quantum circuits between frameworks and onto IBM Q
#[derive(Parser)]
#[command(name = "qbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a QASM file into the target operation stream
    Convert {
        /// Input file (OpenQASM 2.0)
        #[arg(short, long)]
        input: PathBuf,

        /// Wire labels, comma separated (defaults to 0..n)
        #[arg(short, long, value_delimiter = ',')]
        wires: Vec<String>,

        /// Parameter value, NAME=VALUE (repeatable)
        #[arg(short, long = "param", value_parser = parse_binding)]
        params: Vec<(String, f64)>,
    },

    /// Run a QASM file on an IBM Q device
    Run {
        /// Input files (OpenQASM 2.0), submitted as one batch
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Remote backend name
        #[arg(short, long)]
        backend: Option<String>,

        /// Number of shots
        #[arg(short, long)]
        shots: Option<u32>,

        /// Device configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parameter value, NAME=VALUE (repeatable)
        #[arg(short, long = "param", value_parser = parse_binding)]
        params: Vec<(String, f64)>,

        /// Record and print per-step job timing
        #[arg(long)]
        track: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the gate name table
    Gates,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(verbosity = cli.verbose, "qbridge {}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Convert {
            input,
            wires,
            params,
        } => convert::execute(&input, &wires, params),

        Commands::Run {
            input,
            backend,
            shots,
            config,
            params,
            track,
            json,
        } => {
            let options = run::RunOptions {
                backend,
                shots,
                config,
                params,
                track,
                json,
            };
            run::execute(&input, options).await
        }

        Commands::Gates => {
            gates::execute();
            Ok(())
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
