//! Timeline projection.
//!
//! This module provides:
//! - Clipping of orders against a local day window
//! - Row grouping by resource or by customer
//! - View state for the selected day and zoom level

mod layout;
mod view;

pub use layout::{
    layout, project, DayWindow, GroupBy, TimelineBlock, TimelineRow, HOURS_PER_DAY, MS_PER_DAY,
};
pub use view::{TimelineView, DEFAULT_ZOOM_HOURS, MAX_ZOOM_HOURS, MIN_ZOOM_HOURS};
