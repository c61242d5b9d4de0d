use std::{error::Error, fs, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{initialize_db, run_cli};

/// The interactive terminal app for tracking personal finances.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. The file is created if it
    /// does not exist.
    #[arg(long, default_value = "finance.db")]
    db_path: String,

    /// Delete the existing database file before starting.
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging();

    let db_path = Path::new(&args.db_path);

    match db_path.extension() {
        None => {
            eprintln!("Database path must include a file extension (e.g., 'finance.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Database path must include a file extension (e.g., 'finance.db').");
            exit(1);
        }
        _ => {}
    }

    if args.reset && db_path.is_file() {
        println!("Deleting the database at {db_path:#?}");
        fs::remove_file(db_path)?;
    }

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    run_cli(&connection);

    Ok(())
}

/// Send logs to stderr so they do not interleave with the menus on stdout.
///
/// The log level defaults to `warn` and can be changed through the `RUST_LOG`
/// environment variable.
fn setup_logging() {
    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(
            filter::EnvFilter::builder()
                .with_default_directive(filter::LevelFilter::WARN.into())
                .from_env_lossy(),
        ))
        .init();
}
