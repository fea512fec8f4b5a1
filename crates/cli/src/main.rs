use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod sheet;

#[derive(Parser)]
#[command(name = "pipeline-sync")]
#[command(about = "Validate pipeline project spreadsheets and extend the dashboard schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project spreadsheet and print the ingestion report
    Validate {
        file: PathBuf,
        /// Worksheet name; defaults to the first sheet
        #[arg(short, long)]
        sheet: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Add the valuation columns to the projects table
    Migrate {
        /// Target schema; overrides DB_SCHEMA
        #[arg(short, long)]
        schema: Option<String>,
        /// Alternative migration artifact
        #[arg(long)]
        script: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// List the valuation columns currently present in the catalog
    Verify {
        #[arg(short, long)]
        schema: Option<String>,
        #[arg(long)]
        script: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the migration script rendered for a schema
    Script {
        #[arg(short, long)]
        schema: Option<String>,
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    // stdout carries reports; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, sheet, json } => {
            commands::validate::run(&file, sheet.as_deref(), json)
        },
        Commands::Migrate { schema, script, json } => {
            commands::migrate::run(schema.as_deref(), script.as_deref(), json).await
        },
        Commands::Verify { schema, script, json } => {
            commands::verify::run(schema.as_deref(), script.as_deref(), json).await
        },
        Commands::Script { schema, script } => {
            commands::script::run(schema.as_deref(), script.as_deref())
        },
    }
}
