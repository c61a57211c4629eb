// ABOUTME: CLI entry point for syncdb
// ABOUTME: Parses commands and routes to appropriate handlers

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use syncdb::commands;

#[derive(Parser)]
#[command(name = "syncdb")]
#[command(about = "Per-table database dump, transfer, and parallel import", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a site's database to one file per table
    Dump {
        /// Site name from the config file
        #[arg(long)]
        site: String,
        #[arg(long, default_value = "syncdb.toml")]
        config: String,
        /// Override the resolved staging directory
        #[arg(long)]
        staging_dir: Option<String>,
    },
    /// Import a staging directory of dump files into a site's database
    Import {
        /// Site name from the config file
        #[arg(long)]
        site: String,
        /// Staging directory holding the dump files
        #[arg(long)]
        from: PathBuf,
        #[arg(long, default_value = "syncdb.toml")]
        config: String,
        /// Maximum in-flight imports for the chunked strategy
        #[arg(long)]
        concurrency: Option<i64>,
        /// Skip the overwrite confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Dump one site, transfer the files, and import into another
    Sync {
        /// Source site name
        #[arg(long)]
        source: String,
        /// Target site name
        #[arg(long)]
        target: String,
        #[arg(long, default_value = "syncdb.toml")]
        config: String,
        /// Maximum in-flight imports for the chunked strategy
        #[arg(long)]
        concurrency: Option<i64>,
        /// Skip the overwrite confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show how a site's tables would be classified for a dump
    Tables {
        /// Site name from the config file
        #[arg(long)]
        site: String,
        #[arg(long, default_value = "syncdb.toml")]
        config: String,
    },
    /// Show the staging directory a dump of this site would use
    StagingPath {
        /// Site name from the config file
        #[arg(long)]
        site: String,
        #[arg(long, default_value = "syncdb.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            site,
            config,
            staging_dir,
        } => commands::dump(&config, &site, staging_dir).await,
        Commands::Import {
            site,
            from,
            config,
            concurrency,
            yes,
        } => commands::import(&config, &site, &from, concurrency, yes).await,
        Commands::Sync {
            source,
            target,
            config,
            concurrency,
            yes,
        } => commands::sync(&config, &source, &target, concurrency, yes).await,
        Commands::Tables { site, config } => commands::tables(&config, &site).await,
        Commands::StagingPath { site, config } => commands::staging_path(&config, &site).await,
    }
}
