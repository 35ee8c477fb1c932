use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Serve cached rates without touching the network
    #[arg(long, global = true)]
    offline: bool,

    /// Keep state in memory only for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                refresh,
            } => fxconv::AppCommand::Convert {
                amount,
                from,
                to,
                refresh,
            },
            Commands::Swap => fxconv::AppCommand::Swap,
            Commands::Rates { refresh } => fxconv::AppCommand::Rates { refresh },
            Commands::Watch => fxconv::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert; separators and stray characters are cleaned up
        amount: Option<String>,
        /// Source currency code
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code
        #[arg(short, long)]
        to: Option<String>,
        /// Fetch fresh rates even if the cache is still valid
        #[arg(short, long)]
        refresh: bool,
    },
    /// Swap the source and target currencies
    Swap,
    /// List the current rate table
    Rates {
        /// Fetch fresh rates even if the cache is still valid
        #[arg(short, long)]
        refresh: bool,
    },
    /// Interactive converter that refreshes rates in the background
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = fxconv::RunOptions {
        config_path: cli.config_path,
        offline: cli.offline,
        ephemeral: cli.ephemeral,
    };

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), &options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
