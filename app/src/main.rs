#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, InfoStrategy, InitStrategy, ReplayInput, ReplayStrategy, RunInput,
    RunStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "dame")]
#[command(about = "Queen card prediction bot for Telegram", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Run {
        /// Bot token (overrides config and BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Replay a file of announcements, one per line, without Telegram
    Replay {
        file: PathBuf,

        /// Start with the intelligent mode enabled
        #[arg(short, long)]
        active: bool,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => RunStrategy.execute(RunInput { token }).await,
        Commands::Replay { file, active } => {
            ReplayStrategy
                .execute(ReplayInput { file, active })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
