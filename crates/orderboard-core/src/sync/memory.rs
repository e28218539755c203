//! In-process gateway.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::types::Snapshot;
use super::SyncGateway;
use crate::error::{CoreError, Result};
use crate::order::Order;

#[derive(Debug, Default)]
struct State {
    stored: Snapshot,
    fail_reads: bool,
    fail_saves: bool,
    saves: usize,
}

/// Keeps the board in memory. Reads and saves can be made to fail to
/// exercise the error paths of callers.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let gateway = Self::new();
        gateway.state().stored = snapshot;
        gateway
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    pub fn fail_saves(&self, fail: bool) {
        self.state().fail_saves = fail;
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.state().saves
    }

    /// The last saved document.
    pub fn stored(&self) -> Snapshot {
        self.state().stored.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SyncGateway for MemoryGateway {
    async fn read(&self) -> Result<Snapshot> {
        let state = self.state();
        if state.fail_reads {
            return Err(CoreError::Transport("read failed (injected)".into()));
        }
        Ok(state.stored.clone())
    }

    async fn save(&self, orders: &[Order], resources: &[String]) -> Result<()> {
        let mut state = self.state();
        if state.fail_saves {
            return Err(CoreError::Transport("save failed (injected)".into()));
        }
        state.stored = Snapshot {
            orders: orders.to_vec(),
            resources: Some(resources.to_vec()),
        };
        state.saves += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
