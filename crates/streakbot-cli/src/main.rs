use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod discord;

const DEFAULT_LOG_FILTER: &str = "streakbot=info,streakbot_core=info,serenity=warn";

#[derive(Parser)]
#[command(name = "streakbot", version, about = "Streakbot, a daily streak counter for chat")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and run until Ctrl-C
    Run,
    /// Run against stdin/stdout
    Console {
        /// Post announcements to this Discord webhook instead of stdout
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Time until the streak next increases
    Time {
        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run().await,
        Commands::Console { webhook } => commands::console::run(webhook).await,
        Commands::Time { at } => commands::time::run(at),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
