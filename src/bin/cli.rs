//! EmberKV CLI
//!
//! Command-line front-end for a local EmberKV data directory. Opens the
//! engine in-process and dispatches a single command against it — there is
//! no server and no wire protocol.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use emberkv::{Config, Engine, KvError};

/// EmberKV CLI
#[derive(Parser, Debug)]
#[command(name = "emberkv")]
#[command(about = "Embeddable crash-durable key-value store")]
#[command(version)]
struct Args {
    /// Data directory (holds wal/ and segments/)
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Show segment and memtable counts
    Stats,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,emberkv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let engine = match Engine::open(Config::builder().data_dir(&args.data_dir).build()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("failed to open engine: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&engine, &args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(KvError::KeyNotFound) => {
            println!("(nil)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    };

    if let Err(e) = engine.close() {
        eprintln!("failed to close engine: {e}");
        return ExitCode::FAILURE;
    }
    code
}

fn run(engine: &Engine, command: &Commands) -> emberkv::Result<()> {
    match command {
        Commands::Get { key } => {
            let value = engine.get(key.as_bytes())?;
            // Print as UTF-8 when possible, fall back to a byte dump.
            match String::from_utf8(value) {
                Ok(s) => println!("{s}"),
                Err(e) => println!("{:?}", e.into_bytes()),
            }
        }
        Commands::Set { key, value } => {
            engine.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            engine.del(key.as_bytes())?;
            println!("OK");
        }
        Commands::Stats => {
            println!("segments: {}", engine.segment_count());
            println!("memtable records: {}", engine.memtable_len());
        }
    }
    Ok(())
}
