use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(
    name = "lyricseek",
    version,
    about = "Find songs from a lyric fragment and fetch their lyrics",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search songs by lyric fragment and resolve their lyrics
    Search {
        /// Free-text query, usually a remembered line
        query: String,

        /// Print results as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Print Prometheus metrics to stderr when done
        #[arg(long, default_value = "false")]
        metrics: bool,
    },

    /// Extract lyrics from a saved page
    Extract {
        /// HTML file (or text-proxy dump with --plain)
        file: PathBuf,

        /// Treat the file as a text-proxy dump instead of markup
        #[arg(long, default_value = "false")]
        plain: bool,
    },

    /// Show the configured strategy order
    Strategies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    setup_tracing(format, level)?;

    tracing::debug!("lyricseek starting");

    match cli.command {
        Commands::Search {
            query,
            json,
            metrics,
        } => {
            tracing::info!(query = %query, json = %json, "Starting search command");
            commands::search(&config, query, json, metrics).await?;
        }

        Commands::Extract { file, plain } => {
            tracing::info!(file = %file.display(), plain = %plain, "Starting extract command");
            commands::extract(file, plain).await?;
        }

        Commands::Strategies => {
            commands::strategies(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("lyricseek={level},warn")));

    // Logs go to stderr, results to stdout
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
