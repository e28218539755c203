//! Legacy duration unit migration.
//!
//! Early boards stored `duration` in minutes; later ones in hours, with no
//! marker to tell them apart. Untagged records are sniffed: a value above
//! [`LEGACY_MINUTES_THRESHOLD`] is assumed to be minutes. A genuine job of
//! more than 100 hours written before the tag existed is misread by this
//! rule; that is a known data-integrity risk.
//!
//! Every record leaving this module is tagged [`DurationUnit::Hours`], so a
//! record is sniffed at most once.

use tracing::warn;

use crate::order::{DurationUnit, Order};

pub const LEGACY_MINUTES_THRESHOLD: f64 = 100.0;

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Already tagged as hours.
    Unchanged,
    /// Untagged, small enough to be read as hours; tag added.
    Tagged,
    /// Converted from minutes to hours.
    Converted,
}

/// Normalize one order's `duration` to hours.
pub fn migrate_duration(order: &mut Order) -> Migration {
    match order.duration_unit {
        Some(DurationUnit::Hours) => Migration::Unchanged,
        Some(DurationUnit::Minutes) => {
            order.duration /= 60.0;
            order.duration_unit = Some(DurationUnit::Hours);
            Migration::Converted
        }
        None if order.duration > LEGACY_MINUTES_THRESHOLD => {
            warn!(
                order_id = %order.id,
                duration = order.duration,
                "untagged duration above {LEGACY_MINUTES_THRESHOLD} read as legacy minutes"
            );
            order.duration /= 60.0;
            order.duration_unit = Some(DurationUnit::Hours);
            Migration::Converted
        }
        None => {
            order.duration_unit = Some(DurationUnit::Hours);
            Migration::Tagged
        }
    }
}

/// Migrate a whole batch, returning how many records were converted.
pub fn migrate_all(orders: &mut [Order]) -> usize {
    orders
        .iter_mut()
        .map(migrate_duration)
        .filter(|m| *m == Migration::Converted)
        .count()
}
