use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, trace};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "focusflow", version, about = "FocusFlow focus/break interval timer")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Timer settings (durations, targets, auto-start)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Ask for a productivity tip based on today's sessions
    Insight,
    /// Application configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    debug!(verbose = cli.verbose, "focusflow started");
    trace!("args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Insight => commands::insight::run().await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
