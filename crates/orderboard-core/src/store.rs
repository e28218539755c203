//! In-memory order collection.
//!
//! The store keeps orders sorted ascending by `due_time`. The sort is
//! re-applied after every operation that moves a due instant (create,
//! extend, bulk replace) and skipped for status-only changes. The sort is
//! stable, so orders sharing a due instant keep their insertion order.

use tracing::debug;

use crate::duration::parse_duration;
use crate::error::{CoreError, Result};
use crate::migration::migrate_all;
use crate::order::{
    DurationUnit, NewOrder, Order, OrderResult, OrderStatus, MS_PER_HOUR, MS_PER_MINUTE,
};

#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: Vec<Order>,
    last_id: i64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted orders, migrating legacy durations.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let mut store = Self::new();
        store.replace_all(orders);
        store
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All orders, ascending by due time.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn list_active(&self) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.is_active()).collect()
    }

    pub fn list_completed(&self) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.is_completed()).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a new active order and re-sort.
    ///
    /// The order id is derived from `now_ms`; ids issued by one store are
    /// strictly increasing even when two orders are created in the same
    /// millisecond.
    pub fn create(&mut self, new: NewOrder, now_ms: i64) -> Result<&Order> {
        let resource = new.resource.trim();
        if resource.is_empty() {
            return Err(CoreError::invalid_input("resource", "no resource selected"));
        }
        let minutes = parse_duration(&new.duration)?;
        if !(minutes > 0.0) {
            return Err(CoreError::invalid_input(
                "duration",
                format!("'{}' must be a positive duration (e.g. 1.5 or 1:30)", new.duration),
            ));
        }

        let due_time = offset_ms(new.start_time, minutes, MS_PER_MINUTE).ok_or_else(|| {
            CoreError::invalid_input(
                "duration",
                format!("'{}' puts the due time out of range", new.duration),
            )
        })?;

        let id = self.next_id(now_ms);
        let order = Order {
            id: id.clone(),
            customer_name: new.customer_name,
            order_details: new.order_details,
            resource: resource.to_string(),
            start_time: new.start_time,
            due_time,
            duration: minutes / 60.0,
            duration_unit: Some(DurationUnit::Hours),
            notified: false,
            status: OrderStatus::Active,
            result: None,
        };
        debug!(order_id = %id, due_time = order.due_time, "order created");
        self.orders.push(order);
        self.sort();
        self.find(&id)
    }

    /// Push the due instant by `delta_hours` (may be negative) and re-sort.
    pub fn extend(&mut self, id: &str, delta_hours: f64) -> Result<&Order> {
        if delta_hours == 0.0 || !delta_hours.is_finite() {
            return Err(CoreError::invalid_input(
                "delta_hours",
                format!("{delta_hours} is not a usable extension"),
            ));
        }
        let order = self.find_mut(id)?;
        let due_time = offset_ms(order.due_time, delta_hours, MS_PER_HOUR).ok_or_else(|| {
            CoreError::invalid_input(
                "delta_hours",
                format!("{delta_hours} puts the due time out of range"),
            )
        })?;
        order.duration += delta_hours;
        order.due_time = due_time;
        debug!(order_id = %id, delta_hours, due_time = order.due_time, "order extended");
        self.sort();
        self.find(id)
    }

    /// Archive an order with an outcome. Calling it again overwrites the
    /// outcome.
    pub fn complete(&mut self, id: &str, result: OrderResult) -> Result<&Order> {
        let order = self.find_mut(id)?;
        order.status = OrderStatus::Completed;
        order.result = Some(result);
        debug!(order_id = %id, %result, "order completed");
        Ok(&*order)
    }

    /// Bring a completed order back to active.
    ///
    /// `result` is left as it was, so a restored order still carries its
    /// previous outcome.
    pub fn restore(&mut self, id: &str) -> Result<&Order> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.is_completed())
            .ok_or_else(|| CoreError::not_found(id))?;
        order.status = OrderStatus::Active;
        debug!(order_id = %id, "order restored");
        Ok(&*order)
    }

    /// Permanently remove an order. Returns whether anything was removed;
    /// deleting an unknown id is not an error.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        let removed = self.orders.len() != before;
        if removed {
            debug!(order_id = %id, "order deleted");
        }
        removed
    }

    /// Set the one-way `notified` flag. Returns `true` only on the
    /// false→true transition.
    pub fn mark_notified(&mut self, id: &str) -> Result<bool> {
        let order = self.find_mut(id)?;
        if order.notified {
            return Ok(false);
        }
        order.notified = true;
        Ok(true)
    }

    /// Swap in a freshly loaded collection. Returns how many records went
    /// through the legacy minutes→hours conversion.
    pub fn replace_all(&mut self, mut orders: Vec<Order>) -> usize {
        let converted = migrate_all(&mut orders);
        if let Some(max) = orders.iter().filter_map(|o| o.id.parse::<i64>().ok()).max() {
            self.last_id = self.last_id.max(max);
        }
        self.orders = orders;
        self.sort();
        converted
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sort(&mut self) {
        self.orders.sort_by_key(|o| o.due_time);
    }

    fn next_id(&mut self, now_ms: i64) -> String {
        let id = if now_ms > self.last_id {
            now_ms
        } else {
            self.last_id + 1
        };
        self.last_id = id;
        id.to_string()
    }

    fn find(&self, id: &str) -> Result<&Order> {
        self.get(id).ok_or_else(|| CoreError::not_found(id))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::not_found(id))
    }
}

/// `base + amount * unit_ms`, or `None` if the result leaves the `i64` range.
fn offset_ms(base: i64, amount: f64, unit_ms: i64) -> Option<i64> {
    let delta = (amount * unit_ms as f64).round();
    // `as i64` saturates, so reject anything outside the range first.
    if !delta.is_finite() || delta >= i64::MAX as f64 || delta <= i64::MIN as f64 {
        return None;
    }
    base.checked_add(delta as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DAY0_0900: i64 = 9 * MS_PER_HOUR;

    fn new_order(customer: &str, start: i64, duration: &str) -> NewOrder {
        NewOrder {
            customer_name: customer.into(),
            order_details: format!("{customer} job"),
            resource: "Machine A".into(),
            start_time: start,
            duration: duration.into(),
        }
    }

    fn create(store: &mut OrderStore, customer: &str, start: i64, duration: &str) -> String {
        store
            .create(new_order(customer, start, duration), start)
            .unwrap()
            .id
            .clone()
    }

    fn due_times(orders: &[&Order]) -> Vec<i64> {
        orders.iter().map(|o| o.due_time).collect()
    }

    #[test]
    fn create_computes_due_time_and_hours() {
        let mut store = OrderStore::new();
        let order = store
            .create(new_order("Acme", DAY0_0900, "1:30"), 1)
            .unwrap();
        assert_eq!(order.due_time, DAY0_0900 + 90 * MS_PER_MINUTE);
        assert_eq!(order.duration, 1.5);
        assert_eq!(order.status, OrderStatus::Active);
        assert!(!order.notified);
        assert_eq!(order.id, "1");
    }

    #[test]
    fn create_rejects_bad_input_without_mutation() {
        let mut store = OrderStore::new();
        assert!(matches!(
            store.create(new_order("A", 0, "soon"), 1),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(store.create(new_order("A", 0, ""), 1).is_err());
        assert!(store.create(new_order("A", 0, "-1"), 1).is_err());
        let mut no_resource = new_order("A", 0, "1");
        no_resource.resource = "  ".into();
        assert!(store.create(no_resource, 1).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let mut store = OrderStore::new();
        let a = store.create(new_order("A", 0, "1"), 500).unwrap().id.clone();
        let b = store.create(new_order("B", 0, "1"), 500).unwrap().id.clone();
        assert_eq!(a, "500");
        assert_eq!(b, "501");
    }

    #[test]
    fn create_keeps_due_order() {
        let mut store = OrderStore::new();
        create(&mut store, "late", 0, "5");
        create(&mut store, "early", 0, "1");
        create(&mut store, "mid", 0, "3");
        let names: Vec<_> = store.orders().iter().map(|o| o.customer_name.as_str()).collect();
        assert_eq!(names, ["early", "mid", "late"]);
    }

    #[test]
    fn extend_moves_due_time_and_resorts() {
        let mut store = OrderStore::new();
        let a = create(&mut store, "A", 0, "1");
        create(&mut store, "B", 0, "2");
        let t = store.get(&a).unwrap().due_time;

        let order = store.extend(&a, 2.0).unwrap();
        assert_eq!(order.duration, 3.0);
        assert_eq!(order.due_time, t + 2 * MS_PER_HOUR);

        let names: Vec<_> = store.orders().iter().map(|o| o.customer_name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn extend_rejects_zero_and_unknown() {
        let mut store = OrderStore::new();
        let a = create(&mut store, "A", 0, "1");
        assert!(matches!(store.extend(&a, 0.0), Err(CoreError::InvalidInput { .. })));
        assert!(matches!(store.extend(&a, f64::NAN), Err(CoreError::InvalidInput { .. })));
        assert!(matches!(store.extend("nope", 1.0), Err(CoreError::NotFound { .. })));
        assert_eq!(store.get(&a).unwrap().duration, 1.0);
    }

    #[test]
    fn complete_and_restore_scenario() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "Acme", DAY0_0900, "1:30");

        store.complete(&id, OrderResult::Fail).unwrap();
        assert!(store.list_active().is_empty());
        let completed = store.list_completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].result, Some(OrderResult::Fail));

        store.restore(&id).unwrap();
        assert!(store.list_completed().is_empty());
        let active = store.list_active();
        assert_eq!(active.len(), 1);
        // Known artifact: the previous outcome survives a restore.
        assert_eq!(active[0].result, Some(OrderResult::Fail));
    }

    #[test]
    fn complete_twice_overwrites_result() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "A", 0, "1");
        store.complete(&id, OrderResult::Fail).unwrap();
        let order = store.complete(&id, OrderResult::Success).unwrap();
        assert_eq!(order.result, Some(OrderResult::Success));
    }

    #[test]
    fn restore_requires_completed_order() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "A", 0, "1");
        assert!(matches!(store.restore(&id), Err(CoreError::NotFound { .. })));
        assert!(matches!(store.restore("nope"), Err(CoreError::NotFound { .. })));
        assert!(store.get(&id).unwrap().is_active());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "A", 0, "1");
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_due_time_out_of_range() {
        let mut store = OrderStore::new();
        let huge = NewOrder {
            duration: "1e15".into(),
            ..new_order("Acme", 1_700_000_000_000, "1")
        };
        let err = store.create(huge, 5).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { ref field, .. } if field == "duration"));
        assert!(store.is_empty());
        // No id was consumed by the failed create.
        assert_eq!(create(&mut store, "Acme", 0, "1"), "1");
    }

    #[test]
    fn extend_rejects_due_time_out_of_range() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "Acme", 1_700_000_000_000, "1");
        let before = store.get(&id).unwrap().clone();

        for delta in [1e15, -1e15] {
            let err = store.extend(&id, delta).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput { ref field, .. } if field == "delta_hours"));
        }
        assert_eq!(store.get(&id), Some(&before));
    }

    #[test]
    fn mark_notified_is_one_way() {
        let mut store = OrderStore::new();
        let id = create(&mut store, "A", 0, "1");
        assert!(store.mark_notified(&id).unwrap());
        assert!(!store.mark_notified(&id).unwrap());
        assert!(store.get(&id).unwrap().notified);
    }

    #[test]
    fn replace_all_migrates_and_advances_ids() {
        let mut store = OrderStore::new();
        let legacy: Order = serde_json::from_value(serde_json::json!({
            "id": "9000",
            "startTime": 0,
            "dueTime": 7_200_000,
            "duration": 120
        }))
        .unwrap();
        assert_eq!(store.replace_all(vec![legacy]), 1);
        assert_eq!(store.get("9000").unwrap().duration, 2.0);

        let next = store.create(new_order("A", 0, "1"), 10).unwrap();
        assert_eq!(next.id, "9001");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create { start: i64, minutes: u32 },
        Extend { pick: usize, delta: i8 },
        Complete { pick: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..10_000_000, 1u32..600).prop_map(|(start, minutes)| Op::Create { start, minutes }),
            (any::<usize>(), -5i8..5).prop_map(|(pick, delta)| Op::Extend { pick, delta }),
            any::<usize>().prop_map(|pick| Op::Complete { pick }),
        ]
    }

    proptest! {
        #[test]
        fn partitions_stay_sorted(ops in prop::collection::vec(op(), 1..40)) {
            let mut store = OrderStore::new();
            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Create { start, minutes } => {
                        let new = new_order("P", start, &format!("0:{minutes}"));
                        store.create(new, n as i64).unwrap();
                    }
                    Op::Extend { pick, delta } if !store.is_empty() => {
                        let id = store.orders()[pick % store.len()].id.clone();
                        let _ = store.extend(&id, f64::from(delta));
                    }
                    Op::Complete { pick } if !store.is_empty() => {
                        let id = store.orders()[pick % store.len()].id.clone();
                        store.complete(&id, OrderResult::Success).unwrap();
                    }
                    _ => {}
                }
            }
            let active = due_times(&store.list_active());
            let completed = due_times(&store.list_completed());
            prop_assert!(active.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(completed.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
