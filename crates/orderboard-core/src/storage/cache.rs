//! Local mirror of the resource list.
//!
//! Resource names are written here whenever the registry changes and read
//! back when the remote store does not provide a list.

use std::sync::{Arc, Mutex};

use super::Database;
use crate::error::{CoreError, DatabaseError, Result};

/// Key of the single slot holding the resource list.
pub const RESOURCES_KEY: &str = "resources";

#[derive(Clone)]
pub struct ResourceCache {
    db: Arc<Mutex<Database>>,
}

impl ResourceCache {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// The cached list, or `None` if nothing was cached yet.
    ///
    /// A slot holding unreadable JSON counts as empty.
    pub fn load(&self) -> Result<Option<Vec<String>>> {
        let raw = self.lock()?.kv_get(RESOURCES_KEY)?;
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    pub fn store(&self, names: &[String]) -> Result<()> {
        let json = serde_json::to_string(names)?;
        self.lock()?.kv_set(RESOURCES_KEY, &json)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| CoreError::Database(DatabaseError::Locked))
    }
}
