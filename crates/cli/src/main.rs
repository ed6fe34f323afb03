//! Sales Dashboard CLI - connection checks and CSV export.
//!
//! # Usage
//!
//! ```bash
//! # Check the database connection (exits 1 when offline)
//! sd-cli status
//!
//! # Export every order to stdout
//! sd-cli export orders
//!
//! # Export selected customer columns to a file
//! sd-cli export customers --columns name,email,age --output customers.csv
//! ```
//!
//! # Commands
//!
//! - `status` - Connect and report the connection target and server version
//! - `export` - Write one table as CSV, unfiltered

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::export::Table;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Sales dashboard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the database connection
    Status,
    /// Export a table as CSV
    Export {
        /// Table to export
        #[arg(value_enum)]
        table: Table,

        /// Comma-separated columns (defaults to the page defaults)
        #[arg(short, long)]
        columns: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_dashboard=warn,sales_dashboard_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Status => commands::status::run().await?,
        Commands::Export {
            table,
            columns,
            output,
        } => commands::export::run(table, columns.as_deref(), output.as_deref()).await?,
    }
    Ok(())
}
