//! Order entity.
//!
//! An order is a unit of scheduled work: a customer, a resource assignment
//! and a `[start_time, due_time)` window in epoch milliseconds. The JSON
//! shape (camelCase keys) is the one stored by the remote spreadsheet.

pub mod wire;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use wire::parse_timestamp;

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Active,
    /// Soft, restorable archive.
    Completed,
}

/// Outcome recorded when an order is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderResult {
    Success,
    Fail,
}

impl fmt::Display for OrderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderResult::Success => write!(f, "success"),
            OrderResult::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for OrderResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(OrderResult::Success),
            "fail" | "failed" | "failure" => Ok(OrderResult::Fail),
            other => Err(format!("unknown result '{other}' (expected success or fail)")),
        }
    }
}

/// Unit tag for the stored `duration` field.
///
/// Records written before the tag existed carry no unit at all and go
/// through the legacy heuristic in [`crate::migration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Hours,
    Minutes,
}

/// A scheduled unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub order_details: String,
    /// Resource name at assignment time. Not re-validated against the
    /// registry, so it may name a resource that was since removed.
    #[serde(default, deserialize_with = "wire::text")]
    pub resource: String,
    #[serde(deserialize_with = "wire::epoch_ms")]
    pub start_time: i64,
    #[serde(deserialize_with = "wire::epoch_ms")]
    pub due_time: i64,
    /// Hours. Kept in step with `due_time` by every extension.
    #[serde(default, deserialize_with = "wire::number")]
    pub duration: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::duration_unit"
    )]
    pub duration_unit: Option<DurationUnit>,
    #[serde(default, deserialize_with = "wire::flag")]
    pub notified: bool,
    #[serde(default, deserialize_with = "wire::status")]
    pub status: OrderStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::result"
    )]
    pub result: Option<OrderResult>,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Milliseconds until the due instant; negative once overdue.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.due_time - now_ms
    }

    /// Whether `now_ms` falls inside `[start_time, due_time)`.
    pub fn covers(&self, now_ms: i64) -> bool {
        self.start_time <= now_ms && now_ms < self.due_time
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration * 60.0
    }
}

/// Form input for a new order.
///
/// `duration` is raw user text in either notation accepted by
/// [`crate::duration::parse_duration`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub order_details: String,
    pub resource: String,
    pub start_time: i64,
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order {
            id: "1".into(),
            customer_name: "Acme".into(),
            order_details: "Cut panels".into(),
            resource: "Machine A".into(),
            start_time: 0,
            due_time: MS_PER_HOUR,
            duration: 1.0,
            duration_unit: Some(DurationUnit::Hours),
            notified: false,
            status: OrderStatus::Active,
            result: None,
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["customerName"], "Acme");
        assert_eq!(json["dueTime"], MS_PER_HOUR);
        assert_eq!(json["durationUnit"], "hours");
        assert_eq!(json["status"], "active");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn covers_is_half_open() {
        let order = sample();
        assert!(order.covers(0));
        assert!(order.covers(MS_PER_HOUR - 1));
        assert!(!order.covers(MS_PER_HOUR));
        assert!(!order.covers(-1));
    }

    #[test]
    fn result_parses_loosely() {
        assert_eq!("Success".parse::<OrderResult>().unwrap(), OrderResult::Success);
        assert_eq!("fail".parse::<OrderResult>().unwrap(), OrderResult::Fail);
        assert!("maybe".parse::<OrderResult>().is_err());
    }
}
