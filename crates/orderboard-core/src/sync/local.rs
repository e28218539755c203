//! Board snapshot kept in the local SQLite key/value store.
//!
//! Used when no remote endpoint is configured, so a standalone install keeps
//! its orders between runs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::types::{decode_orders, Snapshot};
use super::SyncGateway;
use crate::error::{CoreError, Result};
use crate::order::Order;
use crate::storage::Database;

/// Key of the slot holding the serialized board.
pub const SNAPSHOT_KEY: &str = "board_snapshot";

#[derive(serde::Deserialize)]
struct StoredSnapshot {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    resources: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct LocalGateway {
    db: Arc<Mutex<Database>>,
}

impl LocalGateway {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self
            .db
            .lock()
            .map_err(|_| CoreError::Transport("local store lock poisoned".into()))?;
        f(&db).map_err(|e| match e {
            CoreError::Transport(_) => e,
            other => CoreError::Transport(format!("local store: {other}")),
        })
    }
}

#[async_trait]
impl SyncGateway for LocalGateway {
    async fn read(&self) -> Result<Snapshot> {
        let raw = self.with_db(|db| db.kv_get(SNAPSHOT_KEY))?;
        let Some(raw) = raw else {
            debug!("no local snapshot yet");
            return Ok(Snapshot::default());
        };
        let stored: StoredSnapshot = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Transport(format!("local snapshot unreadable: {e}")))?;
        Ok(Snapshot {
            orders: decode_orders(stored.data),
            resources: stored.resources,
        })
    }

    async fn save(&self, orders: &[Order], resources: &[String]) -> Result<()> {
        let json = serde_json::to_string(&serde_json::json!({
            "data": orders,
            "resources": resources,
        }))?;
        self.with_db(|db| db.kv_set(SNAPSHOT_KEY, &json))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
