//! The board: single owner of all runtime state.
//!
//! Commands run to completion on the board and return the [`Event`] they
//! produced. Persistence is optimistic: local state changes first, the
//! save follows and a failed save never rolls anything back.
//!
//! ```text
//! command ──> Board ──> OrderStore / ResourceRegistry
//!               │
//!               ├──> SyncGateway::save   (whole document, last write wins)
//!               └──> ResourceCache       (resource names only)
//! ```

use chrono::{Local, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::{self, Event};
use crate::notify::{dispatch, Notifier};
use crate::order::{NewOrder, Order, OrderResult};
use crate::registry::{ResourceRegistry, ResourceStatus};
use crate::storage::{Config, ResourceCache};
use crate::store::OrderStore;
use crate::sync::SyncGateway;
use crate::timeline::{layout, GroupBy, TimelineRow, TimelineView};
use crate::timer::{TickReport, TimerEngine};

/// Board shared between the tick loop and command handlers.
pub type SharedBoard = Arc<tokio::sync::Mutex<Board>>;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct Board {
    store: OrderStore,
    registry: ResourceRegistry,
    view: TimelineView,
    engine: TimerEngine,
    gateway: Arc<dyn SyncGateway>,
    cache: Option<ResourceCache>,
    notifier: Arc<dyn Notifier>,
}

impl Board {
    /// Empty board with the default resources, viewing today.
    pub fn new(gateway: Arc<dyn SyncGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: OrderStore::new(),
            registry: ResourceRegistry::default(),
            view: TimelineView::new(Local::now().date_naive()),
            engine: TimerEngine::new(),
            gateway,
            cache: None,
            notifier,
        }
    }

    /// Board set up from the user's configuration.
    pub fn from_config(
        config: &Config,
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut board = Self::new(gateway, notifier);
        board.registry = ResourceRegistry::from_names(config.resources.defaults.iter().cloned());
        board.view = board.view.with_zoom(config.timeline.zoom_hours);
        board.engine = TimerEngine::new().with_urgent_threshold_ms(config.urgent_threshold_ms());
        board
    }

    /// Attach the local resource cache. Cached names replace the current
    /// registry right away so the board has resources before the first load.
    pub fn with_cache(mut self, cache: ResourceCache) -> Self {
        match cache.load() {
            Ok(Some(names)) => {
                debug!(count = names.len(), "resources restored from cache");
                self.registry.replace_all(names);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "resource cache unreadable"),
        }
        self.cache = Some(cache);
        self
    }

    pub fn with_view(mut self, view: TimelineView) -> Self {
        self.view = view;
        self
    }

    pub fn with_engine(mut self, engine: TimerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn into_shared(self) -> SharedBoard {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn view(&self) -> &TimelineView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TimelineView {
        &mut self.view
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    // ── Load ─────────────────────────────────────────────────────────

    /// Replace the board with the stored document.
    ///
    /// On failure nothing changes and the error is returned. Resources come
    /// from the document when it has a list, else from the local cache,
    /// else the current registry is kept.
    pub async fn load(&mut self, now_ms: i64) -> Result<Event> {
        let snapshot = self.gateway.read().await?;
        let migrated = self.store.replace_all(snapshot.orders);

        match snapshot.resources {
            Some(names) => {
                self.registry.replace_all(names);
                self.mirror_resources();
            }
            None => {
                if let Some(names) = self.cached_resources() {
                    self.registry.replace_all(names);
                }
            }
        }

        info!(
            gateway = self.gateway.name(),
            orders = self.store.len(),
            resources = self.registry.len(),
            migrated,
            "board loaded"
        );
        Ok(Event::BoardLoaded {
            orders: self.store.len(),
            resources: self.registry.len(),
            migrated,
            at: events::at(now_ms),
        })
    }

    // ── Order commands ───────────────────────────────────────────────

    pub fn create_order(&mut self, new: NewOrder, now_ms: i64) -> Result<Event> {
        let order = self.store.create(new, now_ms)?.clone();
        Ok(Event::OrderCreated {
            order,
            at: events::at(now_ms),
        })
    }

    pub fn extend_order(&mut self, id: &str, delta_hours: f64, now_ms: i64) -> Result<Event> {
        let order = self.store.extend(id, delta_hours)?;
        Ok(Event::OrderExtended {
            order_id: order.id.clone(),
            delta_hours,
            duration: order.duration,
            due_time: order.due_time,
            at: events::at(now_ms),
        })
    }

    pub fn complete_order(&mut self, id: &str, result: OrderResult, now_ms: i64) -> Result<Event> {
        self.store.complete(id, result)?;
        Ok(Event::OrderCompleted {
            order_id: id.to_string(),
            result,
            at: events::at(now_ms),
        })
    }

    pub fn restore_order(&mut self, id: &str, now_ms: i64) -> Result<Event> {
        self.store.restore(id)?;
        Ok(Event::OrderRestored {
            order_id: id.to_string(),
            at: events::at(now_ms),
        })
    }

    /// Idempotent: deleting an absent id yields `removed: false`.
    pub fn delete_order(&mut self, id: &str, now_ms: i64) -> Event {
        let removed = self.store.delete(id);
        Event::OrderDeleted {
            order_id: id.to_string(),
            removed,
            at: events::at(now_ms),
        }
    }

    // ── Resource commands ────────────────────────────────────────────

    pub fn add_resource(&mut self, name: &str, now_ms: i64) -> Result<Event> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("resource", "name must not be empty"));
        }
        if !self.registry.add(name) {
            return Err(CoreError::invalid_input(
                "resource",
                format!("'{name}' is already registered"),
            ));
        }
        self.mirror_resources();
        Ok(Event::ResourceAdded {
            name: name.to_string(),
            at: events::at(now_ms),
        })
    }

    /// Orders that reference the removed name keep it.
    pub fn remove_resource(&mut self, name: &str, now_ms: i64) -> Event {
        if self.registry.remove(name) {
            self.mirror_resources();
        }
        Event::ResourceRemoved {
            name: name.to_string(),
            at: events::at(now_ms),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn busy_status(&self, now_ms: i64) -> Vec<ResourceStatus> {
        self.registry.busy_status(now_ms, self.store.orders())
    }

    /// Rows for the selected day. Only active orders are drawn.
    pub fn timeline<Tz: TimeZone>(&self, group_by: GroupBy, tz: &Tz) -> Result<Vec<TimelineRow>> {
        let window = self.view.window(tz).ok_or_else(|| {
            CoreError::invalid_input("date", format!("{} has no local midnight", self.view.date()))
        })?;
        Ok(layout(
            self.store.list_active(),
            window,
            group_by,
            &self.registry,
        ))
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Advance countdowns and deliver overdue notifications.
    ///
    /// A failed delivery is logged for that order only.
    pub fn tick(&mut self, now_ms: i64) -> TickReport {
        let report = self.engine.tick(&mut self.store, now_ms);
        for notification in &report.notifications {
            match dispatch(self.notifier.as_ref(), notification) {
                Ok(true) => {}
                Ok(false) => debug!(order_id = %notification.order_id, "notification suppressed"),
                Err(e) => warn!(
                    order_id = %notification.order_id,
                    error = %e,
                    "notification delivery failed"
                ),
            }
        }
        report
    }

    // ── Save ─────────────────────────────────────────────────────────

    /// Save and wait for the outcome. Failures become [`Event::SaveFailed`].
    pub async fn save(&self, now_ms: i64) -> Event {
        persist(
            self.gateway.clone(),
            self.store.orders().to_vec(),
            self.registry.names().to_vec(),
            now_ms,
        )
        .await
    }

    /// Snapshot the board and save it on a separate task.
    pub fn save_in_background(&self, now_ms: i64) -> JoinHandle<Event> {
        tokio::spawn(persist(
            self.gateway.clone(),
            self.store.orders().to_vec(),
            self.registry.names().to_vec(),
            now_ms,
        ))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cached_resources(&self) -> Option<Vec<String>> {
        let cache = self.cache.as_ref()?;
        match cache.load() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "resource cache unreadable");
                None
            }
        }
    }

    fn mirror_resources(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(self.registry.names()) {
                warn!(error = %e, "failed to update resource cache");
            }
        }
    }
}

async fn persist(
    gateway: Arc<dyn SyncGateway>,
    orders: Vec<Order>,
    resources: Vec<String>,
    now_ms: i64,
) -> Event {
    match gateway.save(&orders, &resources).await {
        Ok(()) => {
            info!(gateway = gateway.name(), orders = orders.len(), "board saved");
            Event::BoardSaved {
                orders: orders.len(),
                at: events::at(now_ms),
            }
        }
        Err(e) => {
            warn!(gateway = gateway.name(), error = %e, "save failed; local changes kept");
            Event::SaveFailed {
                message: e.to_string(),
                at: events::at(now_ms),
            }
        }
    }
}

/// Drive [`Board::tick`] every `period` until `on_tick` returns `false`.
///
/// Ticks that mark orders as notified trigger a background save.
pub async fn run_timer<F>(board: SharedBoard, period: Duration, mut on_tick: F)
where
    F: FnMut(&TickReport) -> bool,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let now = now_ms();
        let report = {
            let mut board = board.lock().await;
            let report = board.tick(now);
            if report.changed() {
                board.save_in_background(now);
            }
            report
        };
        if !on_tick(&report) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::order::MS_PER_HOUR;
    use crate::sync::MemoryGateway;

    fn board() -> (Board, Arc<MemoryGateway>, Arc<RecordingNotifier>) {
        let gateway = Arc::new(MemoryGateway::new());
        let notifier = Arc::new(RecordingNotifier::granted());
        let board = Board::new(gateway.clone(), notifier.clone());
        (board, gateway, notifier)
    }

    fn new_order(resource: &str, start: i64, duration: &str) -> NewOrder {
        NewOrder {
            customer_name: "Acme".into(),
            order_details: "Brackets".into(),
            resource: resource.into(),
            start_time: start,
            duration: duration.into(),
        }
    }

    #[test]
    fn create_returns_event_with_order() {
        let (mut board, _, _) = board();
        let event = board.create_order(new_order("Machine A", 0, "2"), 1_000).unwrap();
        match event {
            Event::OrderCreated { order, .. } => {
                assert_eq!(order.id, "1000");
                assert_eq!(order.due_time, 2 * MS_PER_HOUR);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn failed_command_leaves_store_untouched() {
        let (mut board, _, _) = board();
        assert!(board.create_order(new_order("", 0, "1"), 1).is_err());
        assert!(board.extend_order("missing", 1.0, 1).is_err());
        assert!(board.store().is_empty());
    }

    #[test]
    fn add_resource_rejects_duplicates() {
        let (mut board, _, _) = board();
        assert!(board.add_resource("  Lathe ", 0).is_ok());
        assert!(board.registry().contains("Lathe"));
        assert!(matches!(
            board.add_resource("Lathe", 0),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(board.add_resource("   ", 0).is_err());
    }

    #[test]
    fn tick_delivers_once() {
        let (mut board, _, notifier) = board();
        board.create_order(new_order("Machine A", 0, "1"), 10).unwrap();
        assert!(board.tick(MS_PER_HOUR).changed());
        assert!(!board.tick(MS_PER_HOUR + 1_000).changed());
        assert_eq!(notifier.delivered().len(), 1);
    }

    #[tokio::test]
    async fn save_failure_is_reported_not_raised() {
        let (mut board, gateway, _) = board();
        board.create_order(new_order("Machine A", 0, "1"), 10).unwrap();
        gateway.fail_saves(true);
        assert!(matches!(board.save(20).await, Event::SaveFailed { .. }));
        assert_eq!(board.store().len(), 1);

        gateway.fail_saves(false);
        let handle = board.save_in_background(30);
        assert!(matches!(handle.await.unwrap(), Event::BoardSaved { orders: 1, .. }));
        assert_eq!(gateway.stored().orders.len(), 1);
    }

    #[tokio::test]
    async fn run_timer_stops_when_asked() {
        let (board, _, _) = board();
        let shared = board.into_shared();
        let mut ticks = 0;
        run_timer(shared, Duration::from_millis(1), |_| {
            ticks += 1;
            ticks < 3
        })
        .await;
        assert_eq!(ticks, 3);
    }
}
