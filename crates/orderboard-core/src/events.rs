use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderResult};

/// Every state change on the board produces an Event.
/// The CLI prints them; hosts may forward them to a UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    OrderCreated {
        order: Order,
        at: DateTime<Utc>,
    },
    OrderExtended {
        order_id: String,
        delta_hours: f64,
        duration: f64,
        due_time: i64,
        at: DateTime<Utc>,
    },
    OrderCompleted {
        order_id: String,
        result: OrderResult,
        at: DateTime<Utc>,
    },
    OrderRestored {
        order_id: String,
        at: DateTime<Utc>,
    },
    OrderDeleted {
        order_id: String,
        /// `false` when the id was already gone.
        removed: bool,
        at: DateTime<Utc>,
    },
    /// An active order crossed its due instant. Emitted once per order.
    OrderOverdue {
        order_id: String,
        customer_name: String,
        order_details: String,
        due_time: i64,
        at: DateTime<Utc>,
    },
    ResourceAdded {
        name: String,
        at: DateTime<Utc>,
    },
    ResourceRemoved {
        name: String,
        at: DateTime<Utc>,
    },
    BoardLoaded {
        orders: usize,
        resources: usize,
        /// Records converted from legacy minutes.
        migrated: usize,
        at: DateTime<Utc>,
    },
    BoardSaved {
        orders: usize,
        at: DateTime<Utc>,
    },
    /// A save failed; local state was kept.
    SaveFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event changed persisted board state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Event::BoardLoaded { .. } | Event::BoardSaved { .. } | Event::SaveFailed { .. }
        ) && !matches!(self, Event::OrderDeleted { removed: false, .. })
    }
}

/// Convert epoch milliseconds to a UTC timestamp for event stamps.
pub fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
