mod commands;
mod server;
mod ui;

use clap::{Parser, Subcommand, ValueEnum};
use commands::CredentialArgs;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "ucdn-exporter")]
#[command(about = "Prometheus exporter for UCloud CDN domain statistics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the metrics endpoint
    Serve {
        /// Path to exporter config file (YAML, TOML, or JSON)
        config_file: PathBuf,

        /// Override the listen address from the config file
        #[arg(short, long)]
        listen: Option<String>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Run a single scrape and print the result
    Scrape {
        /// Path to exporter config file
        config_file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Validate a config file
    Validate {
        /// Path to exporter config file
        config_file: PathBuf,
    },

    /// List the exported metrics
    Metrics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Serve {
            config_file,
            listen,
            credentials,
        } => {
            commands::serve::execute(config_file, listen, credentials).await?;
        }

        Commands::Scrape {
            config_file,
            format,
            credentials,
        } => {
            commands::scrape::execute(config_file, format, credentials).await?;
        }

        Commands::Validate { config_file } => {
            commands::validate::execute(config_file).await?;
        }

        Commands::Metrics => {
            commands::metrics::execute().await?;
        }
    }

    Ok(())
}
