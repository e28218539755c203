//! Subcommand handlers.
//!
//! Board commands load the stored board, apply one operation, print the
//! resulting event as JSON and save. A failed save is reported as a warning
//! and does not change the exit code.

pub mod config;
pub mod duration;
pub mod order;
pub mod resource;
pub mod sync;
pub mod timeline;
pub mod timer;

use chrono::{DateTime, Local, TimeZone};
use orderboard_core::notify::LogNotifier;
use orderboard_core::storage::SyncConfig;
use orderboard_core::{
    Board, Config, Database, Event, HttpGateway, LocalGateway, ResourceCache, SyncGateway,
};
use std::sync::{Arc, Mutex};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Local database shared by the resource cache and the local gateway.
pub(crate) fn open_database() -> Result<Arc<Mutex<Database>>, Box<dyn std::error::Error>> {
    Ok(Arc::new(Mutex::new(Database::open()?)))
}

/// The configured gateway: the web-app endpoint when one is set, the local
/// snapshot otherwise.
pub(crate) fn gateway(
    sync: &SyncConfig,
    db: &Arc<Mutex<Database>>,
) -> Result<Arc<dyn SyncGateway>, Box<dyn std::error::Error>> {
    Ok(match HttpGateway::from_config(sync)? {
        Some(http) => Arc::new(http),
        None => Arc::new(LocalGateway::new(db.clone())),
    })
}

/// Build the board from config and load the stored document.
pub(crate) async fn load_board(config: &Config) -> Result<Board, Box<dyn std::error::Error>> {
    let db = open_database()?;
    let gateway = gateway(&config.sync, &db)?;
    let notifier = Arc::new(LogNotifier::new(std::io::stderr(), config.notifications.enabled));
    let mut board = Board::from_config(config, gateway, notifier)
        .with_cache(ResourceCache::new(db));
    board.load(orderboard_core::now_ms()).await?;
    Ok(board)
}

pub(crate) fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// Save and report the outcome. Never fails the command.
pub(crate) async fn save_board(board: &Board) {
    if let Event::SaveFailed { message, .. } = board.save(orderboard_core::now_ms()).await {
        eprintln!("warning: changes kept locally but not saved: {message}");
    }
}

/// Print the event, then save if it changed anything.
pub(crate) async fn commit(board: &Board, event: Event) -> CliResult {
    print_event(&event)?;
    if event.is_mutation() {
        save_board(board).await;
    }
    Ok(())
}

pub(crate) fn local_time(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(t) => format_local(t),
        None => ms.to_string(),
    }
}

fn format_local(t: DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
