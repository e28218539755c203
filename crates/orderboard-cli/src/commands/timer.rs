//! Countdown commands.

use clap::Subcommand;
use orderboard_core::{now_ms, run_timer, Config, TickReport};
use std::time::Duration;

use super::{load_board, print_event, save_board, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one tick and print countdowns as JSON
    Status,
    /// Tick continuously until interrupted
    Watch {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

pub async fn run(action: TimerAction) -> CliResult {
    let config = Config::load()?;
    let mut board = load_board(&config).await?;

    match action {
        TimerAction::Status => {
            let report = board.tick(now_ms());
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.changed() {
                save_board(&board).await;
            }
        }
        TimerAction::Watch { ticks } => {
            let period = Duration::from_millis(config.timer.tick_interval_ms.max(1));
            let shared = board.into_shared();
            let mut seen = 0u64;
            let timer = run_timer(shared.clone(), period, |report| {
                print_report(report);
                seen += 1;
                ticks.map_or(true, |limit| seen < limit)
            });

            tokio::select! {
                _ = timer => {}
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("stopping");
                }
            }

            let board = shared.lock().await;
            save_board(&board).await;
        }
    }
    Ok(())
}

fn print_report(report: &TickReport) {
    for event in &report.events {
        if let Err(e) = print_event(event) {
            tracing::warn!(error = %e, "failed to print event");
        }
    }
    let line = report
        .countdowns
        .iter()
        .map(|c| format!("{} {}", c.order_id, c.label()))
        .collect::<Vec<_>>()
        .join("  |  ");
    if line.is_empty() {
        println!("no active orders");
    } else {
        println!("{line}");
    }
}
