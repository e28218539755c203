//! Resource commands.

use clap::Subcommand;
use orderboard_core::{now_ms, Config};

use super::{commit, load_board, CliResult};

#[derive(Subcommand)]
pub enum ResourceAction {
    /// Register a machine or operator
    Add {
        /// Resource name
        name: String,
    },
    /// Remove a resource (orders keep referencing it by name)
    Remove {
        /// Resource name
        name: String,
    },
    /// List registered resources
    List {
        /// Show whether each resource is busy right now
        #[arg(long)]
        status: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: ResourceAction) -> CliResult {
    let config = Config::load()?;
    let mut board = load_board(&config).await?;
    let now = now_ms();

    match action {
        ResourceAction::Add { name } => {
            let event = board.add_resource(&name, now)?;
            commit(&board, event).await?;
        }
        ResourceAction::Remove { name } => {
            let event = board.remove_resource(&name, now);
            commit(&board, event).await?;
        }
        ResourceAction::List { status, json } => {
            if status {
                let statuses = board.busy_status(now);
                if json {
                    println!("{}", serde_json::to_string_pretty(&statuses)?);
                } else {
                    for s in statuses {
                        println!("{}\t{}", s.name, if s.busy { "busy" } else { "idle" });
                    }
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(board.registry().names())?);
            } else {
                for name in board.registry().names() {
                    println!("{name}");
                }
            }
        }
    }
    Ok(())
}
