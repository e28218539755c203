use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "orderboard", version, about = "Order and resource scheduling board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work orders
    Order {
        #[command(subcommand)]
        action: commands::order::OrderAction,
    },
    /// Machines and operators
    Resource {
        #[command(subcommand)]
        action: commands::resource::ResourceAction,
    },
    /// Day timeline
    Timeline {
        #[command(subcommand)]
        action: commands::timeline::TimelineAction,
    },
    /// Countdowns and overdue notifications
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Duration parsing helpers
    Duration {
        #[command(subcommand)]
        action: commands::duration::DurationAction,
    },
    /// Remote store synchronization
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ORDERBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Order { action } => commands::order::run(action).await,
        Commands::Resource { action } => commands::resource::run(action).await,
        Commands::Timeline { action } => commands::timeline::run(action).await,
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Duration { action } => commands::duration::run(action),
        Commands::Sync { action } => commands::sync::run(action).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
