mod pipeline;

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use turnlog_config::LoggerConfig;

#[derive(Debug, Parser)]
#[command(
    name = "turnlog",
    version,
    about = "Dual-sink conversation-turn logger: JSONL journal + searchable memory store"
)]
struct Cli {
    /// Config file location (default: ~/.openclaw/turnlog.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read one message JSON from stdin and record it to both sinks.
    /// This is the default when no subcommand is given.
    Log,
    /// Print the resolved config file location.
    ConfigPath,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    // Diagnostics go to stderr only; stdout stays clean for callers that
    // pipe through us.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(LoggerConfig::default_path);
    let config = match LoggerConfig::load_from(&config_path) {
        Ok(config) => config,
        Err(err) => {
            // A broken config file must not break the conversation either.
            eprintln!("[turnlog error] config: {err}");
            LoggerConfig::from_env()
        }
    };

    match cli.command.unwrap_or(Commands::Log) {
        Commands::Log => {
            let mut input = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut input) {
                eprintln!("[turnlog error] {err}");
                return;
            }
            pipeline::log_message(&input, &config).await;
        }
        Commands::ConfigPath => {
            println!("{}", config_path.display());
        }
    }
}
