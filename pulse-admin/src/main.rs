//! pulse-admin - Pulse database administration tool
//!
//! Creates or opens the Pulse database, runs the idempotent schema and
//! seed sequence, and reports per-table row counts for a quick health
//! check of a deployment.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pulse_core::config;
use pulse_core::db::init::init_database;
use tracing::info;

mod tables;

/// Command-line arguments for pulse-admin
#[derive(Parser, Debug)]
#[command(name = "pulse-admin")]
#[command(about = "Administration tool for the Pulse survey platform")]
#[command(version)]
struct Cli {
    /// Root folder holding pulse.db (overrides env and config file)
    #[arg(short, long, env = "PULSE_ROOT_FOLDER")]
    root_folder: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema and seed reference data
    Init,
    /// Print row counts for every Pulse table
    Tables,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting pulse-admin v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let root_folder = config::resolve_root_folder(cli.root_folder.as_deref())?;
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    // Both commands run the idempotent init sequence, so a bare
    // `tables` on a fresh root folder still works
    let pool = init_database(&db_path).await?;

    match cli.command {
        Command::Init => {
            info!("Database ready");
        }
        Command::Tables => {
            let summaries = tables::table_summaries(&pool).await?;
            println!("{:<16} {:>10}", "table", "rows");
            for summary in &summaries {
                println!("{:<16} {:>10}", summary.name, summary.row_count);
            }
        }
    }

    Ok(())
}
