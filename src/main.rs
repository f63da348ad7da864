//! CLI entry point for the Bengals ETL pipeline.
//!
//! With no subcommand, runs the pipeline once: fetch team and receiver CSVs
//! from S3, clean and join them, and overwrite the destination table.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bengals_etl::config::DbConfig;
use bengals_etl::store::{MemoryStore, S3Store};
use bengals_etl::{Config, db, output};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bengals_etl")]
#[command(about = "Load weekly Bengals team and receiver stats into a database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline (the default when no subcommand is given)
    Run {
        /// Read the CSV objects from a local directory instead of S3
        #[arg(long, value_name = "DIR")]
        source_dir: Option<PathBuf>,
    },
    /// Print the contents of a table in the database
    View {
        /// Table to read (defaults to DEST_TABLE)
        #[arg(short, long)]
        table: Option<String>,

        /// Print JSON records instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Execute a SQL file against the database and print the rows
    Query {
        /// Path to the SQL file
        #[arg(value_name = "SQL_FILE")]
        path: PathBuf,

        /// Print JSON records instead of CSV
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| bengals_etl::config::DEFAULT_LOG_FILE_PATH.to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bengals_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    // Fail fast on missing configuration before any network call.
    match cli.command.unwrap_or(Commands::Run { source_dir: None }) {
        Commands::Run { source_dir } => {
            let config = Config::from_env()?;
            info!(?config, "Configuration loaded");

            let data = match source_dir {
                Some(dir) => {
                    info!(dir = %dir.display(), "Reading objects from local directory");
                    let store = MemoryStore::from_dir(&dir)?;
                    bengals_etl::run(&store, &config).await?
                }
                None => {
                    let store = S3Store::new(&config).await;
                    bengals_etl::run(&store, &config).await?
                }
            };
            info!(rows = data.len(), columns = data.columns().len(), "Run complete");
        }
        Commands::View { table, json } => {
            let config = DbConfig::from_env()?;
            let name = table.unwrap_or_else(|| config.dest_table.clone());
            let data = db::view_table(&config.db_connection_string, &name).await?;
            print_table(&data, json)?;
        }
        Commands::Query { path, json } => {
            let config = DbConfig::from_env()?;
            let data = db::run_query_file(&config.db_connection_string, &path).await?;
            print_table(&data, json)?;
        }
    }

    Ok(())
}

fn print_table(table: &bengals_etl::Table, json: bool) -> Result<()> {
    let stdout = std::io::stdout().lock();
    if json {
        output::write_json(stdout, table)
    } else {
        output::write_csv(stdout, table)
    }
}
