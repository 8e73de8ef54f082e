use abap_debug_bridge::config::SessionConfig;
use abap_debug_bridge::terminal::{ide_id, TerminalIdStore};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abap-debug-bridge")]
#[command(about = "Remote ABAP debugger session bridge", version, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// JSON session configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the terminal id, creating it on first use
    TerminalId {
        /// Override the terminal id file location
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the IDE id derived from a connection id
    IdeId {
        /// Connection id
        conn_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level: &str = if cli.verbose { "debug" } else { &cli.log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::TerminalId { path } => {
            if let Some(path) = path {
                config.terminal_id_path = path;
            }
            let store = TerminalIdStore::new(config.terminal_id_path());
            let id = store
                .get_or_create()
                .await
                .with_context(|| format!("reading terminal id from {}", store.path().display()))?;
            println!("{}", id);
        }
        Commands::IdeId { conn_id } => {
            println!("{}", ide_id(&conn_id));
        }
    }

    Ok(())
}
