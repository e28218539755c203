//! Board persistence.
//!
//! The whole board (orders plus resource names) is read and written as one
//! document through a [`SyncGateway`]. Saves overwrite the stored document;
//! there is no merge and the last writer wins.
//!
//! Gateways:
//! - [`HttpGateway`]: spreadsheet web-app endpoint (`?action=read|save`)
//! - [`LocalGateway`]: snapshot in the local SQLite key/value store
//! - [`MemoryGateway`]: in-process store with failure injection

mod http;
mod local;
mod memory;
mod types;

pub use http::HttpGateway;
pub use local::{LocalGateway, SNAPSHOT_KEY};
pub use memory::MemoryGateway;
pub use types::{decode_orders, ReadResponse, SaveResponse, Snapshot};

use async_trait::async_trait;

use crate::error::Result;
use crate::order::Order;

/// Read/save access to the stored board.
///
/// Implementations report every failure as [`crate::CoreError::Transport`]
/// (or `Http` for client-level errors) so callers can keep local state
/// untouched.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Fetch the stored board.
    async fn read(&self) -> Result<Snapshot>;

    /// Overwrite the stored board with `orders` and `resources`.
    async fn save(&self, orders: &[Order], resources: &[String]) -> Result<()>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
