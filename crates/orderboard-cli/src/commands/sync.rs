//! Sync commands.
//!
//! `pull` copies the configured store into the local snapshot and `push`
//! sends the local snapshot to the configured endpoint.

use clap::Subcommand;
use orderboard_core::migration::migrate_all;
use orderboard_core::{now_ms, Config, Event, HttpGateway, LocalGateway, SyncGateway};

use super::{gateway, open_database, print_event, CliResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Read the board from the configured store into the local snapshot
    Pull,
    /// Overwrite the configured endpoint with the local snapshot
    Push,
}

pub async fn run(action: SyncAction) -> CliResult {
    let config = Config::load()?;
    let db = open_database()?;
    let local = LocalGateway::new(db.clone());

    match action {
        SyncAction::Pull => {
            let source = gateway(&config.sync, &db)?;
            let mut snapshot = source.read().await?;
            let migrated = migrate_all(&mut snapshot.orders);
            let resources = snapshot
                .resources
                .clone()
                .unwrap_or_else(|| config.resources.defaults.clone());
            if source.name() != local.name() {
                local.save(&snapshot.orders, &resources).await?;
            }
            print_event(&Event::BoardLoaded {
                orders: snapshot.orders.len(),
                resources: resources.len(),
                migrated,
                at: orderboard_core::events::at(now_ms()),
            })?;
        }
        SyncAction::Push => {
            let remote = HttpGateway::from_config(&config.sync)?
                .ok_or("no sync.endpoint configured")?;
            let snapshot = local.read().await?;
            let resources = snapshot
                .resources
                .unwrap_or_else(|| config.resources.defaults.clone());
            remote.save(&snapshot.orders, &resources).await?;
            print_event(&Event::BoardSaved {
                orders: snapshot.orders.len(),
                at: orderboard_core::events::at(now_ms()),
            })?;
        }
    }
    Ok(())
}
