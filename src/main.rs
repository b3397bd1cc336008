/// Main entry point for the habit streak engine server
///
/// This file sets up logging, parses command line arguments, opens the
/// database and serves JSON-RPC requests over stdin/stdout.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use habit_streak_engine::rpc::RpcServer;
use habit_streak_engine::{HabitCap, HabitEngine, LimitGate, SqliteStore, SystemClock, Unlimited};

const DATA_DIR_NAME: &str = "habit_streak_engine";
const DATABASE_FILE: &str = "habits.db";

/// Directories tried for the default database, most preferred first
fn candidate_dirs() -> Vec<PathBuf> {
    [
        dirs::home_dir().map(|home| home.join(format!(".{}", DATA_DIR_NAME))),
        dirs::data_dir().map(|data| data.join(DATA_DIR_NAME)),
        dirs::config_dir().map(|config| config.join(DATA_DIR_NAME)),
        std::env::current_dir().ok().map(|cwd| cwd.join(format!(".{}", DATA_DIR_NAME))),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Create `dir` if needed and check that a file can be written inside it
fn is_writable(dir: &Path) -> bool {
    let check_file = dir.join(".write_check");
    let writable = std::fs::create_dir_all(dir).is_ok() && std::fs::write(&check_file, b"").is_ok();
    let _ = std::fs::remove_file(&check_file);
    writable
}

/// Database location used when `--database` is not given
fn default_database_path() -> std::io::Result<PathBuf> {
    if let Some(dir) = candidate_dirs().into_iter().find(|dir| is_writable(dir)) {
        return Ok(dir.join(DATABASE_FILE));
    }

    let temp_dir = std::env::temp_dir().join(DATA_DIR_NAME);
    std::fs::create_dir_all(&temp_dir)?;
    tracing::warn!("No writable data directory, using {}", temp_dir.display());
    Ok(temp_dir.join(DATABASE_FILE))
}

/// Command line arguments for the habit streak engine server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite database file (defaults to a per-user data directory)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Maximum number of active habits per user (unlimited if omitted)
    #[arg(long)]
    max_habits: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_streak_engine={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting habit streak engine");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let gate: Box<dyn LimitGate> = match args.max_habits {
        Some(max) => {
            info!("Limiting users to {} active habits", max);
            Box::new(HabitCap::new(max))
        }
        None => Box::new(Unlimited),
    };

    let store = SqliteStore::new(db_path)?;
    let engine = HabitEngine::new(store, Box::new(SystemClock), gate);

    // Serve JSON-RPC over stdin/stdout until the client hangs up
    let server = RpcServer::new(engine);
    server.run().await?;

    info!("Habit streak engine shutdown complete");
    Ok(())
}
