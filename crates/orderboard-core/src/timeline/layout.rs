//! Projection of orders onto a 24-hour day grid.
//!
//! Each order whose `[start_time, due_time)` interval intersects the day
//! window becomes a block positioned in hours from local midnight. Parts of
//! an order outside the window are dropped; there is no continuation marker
//! across days. Overlapping blocks within one row are left as they are.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::order::{Order, MS_PER_HOUR};
use crate::registry::ResourceRegistry;

pub const HOURS_PER_DAY: f64 = 24.0;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// A `[start_ms, start_ms + 24h)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start_ms: i64,
}

impl DayWindow {
    pub fn starting_at(start_ms: i64) -> Self {
        Self { start_ms }
    }

    /// Window beginning at local midnight of `date` in `tz`.
    ///
    /// Returns `None` only if midnight does not exist in that zone.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<Self> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|dt| Self::starting_at(dt.timestamp_millis()))
    }

    pub fn end_ms(&self) -> i64 {
        self.start_ms + MS_PER_DAY
    }

    /// Hours from the window start, unclipped.
    pub fn hours_from_start(&self, ms: i64) -> f64 {
        (ms - self.start_ms) as f64 / MS_PER_HOUR as f64
    }
}

/// Row dimension for the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Resource,
    Customer,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Resource => write!(f, "resource"),
            GroupBy::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resource" => Ok(GroupBy::Resource),
            "customer" => Ok(GroupBy::Customer),
            other => Err(format!("unknown grouping '{other}' (expected resource or customer)")),
        }
    }
}

/// One order clipped to a day window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBlock {
    pub order_id: String,
    pub customer_name: String,
    pub order_details: String,
    pub resource: String,
    /// Hours from midnight, in `[0, 24)`.
    pub offset_hours: f64,
    /// Visible length in hours, in `(0, 24]`.
    pub span_hours: f64,
    pub start_time: i64,
    pub due_time: i64,
    /// The order started before the window.
    pub clipped_start: bool,
    /// The order runs past the window.
    pub clipped_end: bool,
}

impl TimelineBlock {
    pub fn end_hours(&self) -> f64 {
        self.offset_hours + self.span_hours
    }

    pub fn left_pct(&self) -> f64 {
        self.offset_hours / HOURS_PER_DAY * 100.0
    }

    pub fn width_pct(&self) -> f64 {
        self.span_hours / HOURS_PER_DAY * 100.0
    }

    /// `HH:MM - HH:MM` of the order's real (unclipped) window in `tz`.
    pub fn time_range_label<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        format!(
            "{} - {}",
            clock_label(self.start_time, tz),
            clock_label(self.due_time, tz)
        )
    }
}

/// A labelled row of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub key: String,
    /// `false` for rows keyed by a resource no longer in the registry.
    pub registered: bool,
    pub blocks: Vec<TimelineBlock>,
}

impl TimelineRow {
    fn new(key: impl Into<String>, registered: bool) -> Self {
        Self {
            key: key.into(),
            registered,
            blocks: Vec::new(),
        }
    }
}

/// Clip one order to `window`.
///
/// Returns `None` when nothing of the order is visible that day, including
/// degenerate orders whose due instant is not after their start.
pub fn project(order: &Order, window: DayWindow) -> Option<TimelineBlock> {
    let start = window.hours_from_start(order.start_time);
    let end = window.hours_from_start(order.due_time);
    let offset = start.max(0.0);
    let span = end.min(HOURS_PER_DAY) - offset;
    if !(span > 0.0) {
        return None;
    }
    Some(TimelineBlock {
        order_id: order.id.clone(),
        customer_name: order.customer_name.clone(),
        order_details: order.order_details.clone(),
        resource: order.resource.clone(),
        offset_hours: offset,
        span_hours: span,
        start_time: order.start_time,
        due_time: order.due_time,
        clipped_start: start < 0.0,
        clipped_end: end > HOURS_PER_DAY,
    })
}

/// Lay out `orders` for one day, bucketed by `group_by`.
///
/// Resource grouping yields one row per registered resource in registry
/// order (empty rows included), followed by rows for resources that orders
/// still reference but the registry no longer has, sorted by name.
/// Customer grouping yields a row per customer with at least one visible
/// block, sorted by name. Blocks keep the order of `orders`.
pub fn layout<'a, I>(
    orders: I,
    window: DayWindow,
    group_by: GroupBy,
    registry: &ResourceRegistry,
) -> Vec<TimelineRow>
where
    I: IntoIterator<Item = &'a Order>,
{
    let blocks = orders.into_iter().filter_map(|o| project(o, window));

    match group_by {
        GroupBy::Customer => {
            let mut rows: BTreeMap<String, TimelineRow> = BTreeMap::new();
            for block in blocks {
                rows.entry(block.customer_name.clone())
                    .or_insert_with(|| TimelineRow::new(block.customer_name.clone(), true))
                    .blocks
                    .push(block);
            }
            rows.into_values().collect()
        }
        GroupBy::Resource => {
            let mut rows: Vec<TimelineRow> = registry
                .names()
                .iter()
                .map(|name| TimelineRow::new(name.clone(), true))
                .collect();
            let mut orphans: BTreeMap<String, TimelineRow> = BTreeMap::new();
            for block in blocks {
                match rows.iter_mut().find(|r| r.key == block.resource) {
                    Some(row) => row.blocks.push(block),
                    None => orphans
                        .entry(block.resource.clone())
                        .or_insert_with(|| TimelineRow::new(block.resource.clone(), false))
                        .blocks
                        .push(block),
                }
            }
            rows.extend(orphans.into_values());
            rows
        }
    }
}

fn clock_label<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    tz.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
