//! Wire documents exchanged with the board store.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::order::Order;

/// The whole board as stored remotely.
///
/// Serialized as `{ "data": [...], "resources": [...] }`, which is both the
/// save body and the local snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "data", default)]
    pub orders: Vec<Order>,
    /// `None` when the store holds no resource list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
}

/// Body returned by `?action=read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResponse {
    pub status: String,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub resources: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by `?action=save`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode raw order records, dropping the ones that cannot be read.
///
/// Spreadsheet rows are hand-editable, so one broken row must not hide the
/// rest of the board.
pub fn decode_orders(values: Vec<serde_json::Value>) -> Vec<Order> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Order>(value) {
            Ok(order) => Some(order),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable order record");
                None
            }
        })
        .collect()
}
