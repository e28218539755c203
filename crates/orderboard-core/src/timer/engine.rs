//! Countdown engine.
//!
//! The engine is a clock-driven state machine over the order store. It does
//! not own a thread or timer: the caller invokes `tick()` periodically (once
//! a second on the board) with the current time.
//!
//! ## Per-order transitions
//!
//! ```text
//! active, notified=false --(remaining <= 0)--> active, notified=true
//! ```
//!
//! The transition emits one [`Event::OrderOverdue`] and one
//! [`Notification`]. Nothing in the engine resets `notified`, so however many
//! ticks are missed or repeated an order is announced at most once.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::countdown::{Countdown, TimeLeft, Urgency, DEFAULT_URGENT_THRESHOLD_MS};
use crate::events::{self, Event};
use crate::notify::Notification;
use crate::order::Order;
use crate::store::OrderStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimerEngine {
    urgent_threshold_ms: i64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub at_ms: i64,
    /// One entry per active order, in due order.
    pub countdowns: Vec<Countdown>,
    /// Orders that became overdue on this tick.
    pub events: Vec<Event>,
    pub notifications: Vec<Notification>,
}

impl TickReport {
    /// Whether the tick flipped any `notified` flag, i.e. a save is due.
    pub fn changed(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn overdue_count(&self) -> usize {
        self.countdowns
            .iter()
            .filter(|c| c.urgency == Urgency::Overdue)
            .count()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            urgent_threshold_ms: DEFAULT_URGENT_THRESHOLD_MS,
        }
    }

    pub fn with_urgent_threshold_ms(mut self, ms: i64) -> Self {
        self.urgent_threshold_ms = ms.max(0);
        self
    }

    pub fn urgent_threshold_ms(&self) -> i64 {
        self.urgent_threshold_ms
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn countdown(&self, order: &Order, now_ms: i64) -> Countdown {
        let remaining_ms = order.remaining_ms(now_ms);
        Countdown {
            order_id: order.id.clone(),
            remaining_ms,
            urgency: Urgency::classify_with(remaining_ms, self.urgent_threshold_ms),
            time_left: TimeLeft::from_ms(remaining_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance every active order to `now_ms`.
    pub fn tick(&self, store: &mut OrderStore, now_ms: i64) -> TickReport {
        let mut report = TickReport {
            at_ms: now_ms,
            ..TickReport::default()
        };

        let due: Vec<String> = store
            .list_active()
            .into_iter()
            .filter(|o| o.remaining_ms(now_ms) <= 0 && !o.notified)
            .map(|o| o.id.clone())
            .collect();

        for id in &due {
            match store.mark_notified(id) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(order_id = %id, error = %e, "could not flag overdue order");
                    continue;
                }
            }
            let Some(order) = store.get(id) else { continue };
            info!(
                order_id = %order.id,
                customer = %order.customer_name,
                overdue_ms = -order.remaining_ms(now_ms),
                "order overdue"
            );
            report.notifications.push(Notification::overdue(order));
            report.events.push(Event::OrderOverdue {
                order_id: order.id.clone(),
                customer_name: order.customer_name.clone(),
                order_details: order.order_details.clone(),
                due_time: order.due_time,
                at: events::at(now_ms),
            });
        }

        report.countdowns = store
            .list_active()
            .into_iter()
            .map(|o| self.countdown(o, now_ms))
            .collect();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{NewOrder, OrderResult, MS_PER_MINUTE};

    fn store_with(due_offsets_min: &[i64]) -> (OrderStore, Vec<String>) {
        let mut store = OrderStore::new();
        let ids = due_offsets_min
            .iter()
            .enumerate()
            .map(|(n, offset)| {
                let new = NewOrder {
                    customer_name: format!("C{n}"),
                    order_details: format!("job {n}"),
                    resource: "Machine A".into(),
                    start_time: offset * MS_PER_MINUTE - MS_PER_MINUTE,
                    duration: "0:01".into(),
                };
                store.create(new, n as i64 + 1).unwrap().id.clone()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn fires_exactly_once_at_the_deadline() {
        let (mut store, ids) = store_with(&[0]);
        let engine = TimerEngine::new();

        let first = engine.tick(&mut store, 0);
        assert!(first.changed());
        assert_eq!(first.notifications.len(), 1);
        assert_eq!(first.notifications[0].order_id, ids[0]);
        assert!(store.get(&ids[0]).unwrap().notified);

        for later in 1..50 {
            let report = engine.tick(&mut store, later * 1_000);
            assert!(report.notifications.is_empty());
            assert!(!report.changed());
        }
    }

    #[test]
    fn missed_ticks_still_fire_once() {
        let (mut store, _) = store_with(&[10]);
        let engine = TimerEngine::new();
        assert!(!engine.tick(&mut store, 0).changed());
        // Host was suspended well past the deadline.
        let resumed = engine.tick(&mut store, 60 * MS_PER_MINUTE);
        assert_eq!(resumed.notifications.len(), 1);
        assert!(!engine.tick(&mut store, 61 * MS_PER_MINUTE).changed());
    }

    #[test]
    fn countdowns_classify_each_active_order() {
        let (mut store, ids) = store_with(&[-1, 3, 60]);
        store.complete(&ids[2], OrderResult::Success).unwrap();
        let report = TimerEngine::new().tick(&mut store, 0);

        let urgencies: Vec<_> = report.countdowns.iter().map(|c| c.urgency).collect();
        assert_eq!(urgencies, [Urgency::Overdue, Urgency::Urgent]);
        assert_eq!(report.overdue_count(), 1);
        assert_eq!(report.countdowns[1].label(), "3m 0s");
    }

    #[test]
    fn completed_orders_are_never_announced() {
        let (mut store, ids) = store_with(&[-5]);
        store.complete(&ids[0], OrderResult::Fail).unwrap();
        let report = TimerEngine::new().tick(&mut store, 0);
        assert!(report.countdowns.is_empty());
        assert!(!report.changed());
        assert!(!store.get(&ids[0]).unwrap().notified);
    }

    #[test]
    fn orders_flagged_in_the_store_are_not_announced() {
        let (mut store, ids) = store_with(&[-5, -2]);
        assert!(store.mark_notified(&ids[0]).unwrap());
        let report = TimerEngine::new().tick(&mut store, 0);
        assert_eq!(report.notifications.len(), 1);
        assert_eq!(report.notifications[0].order_id, ids[1]);
        assert!(!store.mark_notified(&ids[1]).unwrap());
    }

    #[test]
    fn custom_threshold_widens_urgent_band() {
        let (mut store, _) = store_with(&[20]);
        let engine = TimerEngine::new().with_urgent_threshold_ms(30 * MS_PER_MINUTE);
        let report = engine.tick(&mut store, 0);
        assert_eq!(report.countdowns[0].urgency, Urgency::Urgent);
    }
}
