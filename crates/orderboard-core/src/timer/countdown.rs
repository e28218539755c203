//! Remaining-time arithmetic and urgency classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::{MS_PER_HOUR, MS_PER_MINUTE};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR as u64;

/// Default width of the "urgent" band before the due instant.
pub const DEFAULT_URGENT_THRESHOLD_MS: i64 = 5 * MS_PER_MINUTE;

/// Visual urgency of an active order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    /// Due within the urgent threshold.
    Urgent,
    Overdue,
}

impl Urgency {
    /// Classify with the default five-minute threshold.
    pub fn classify(remaining_ms: i64) -> Self {
        Self::classify_with(remaining_ms, DEFAULT_URGENT_THRESHOLD_MS)
    }

    pub fn classify_with(remaining_ms: i64, urgent_threshold_ms: i64) -> Self {
        if remaining_ms < 0 {
            Urgency::Overdue
        } else if remaining_ms < urgent_threshold_ms {
            Urgency::Urgent
        } else {
            Urgency::Normal
        }
    }
}

/// A millisecond count split into days/hours/minutes/seconds.
///
/// Pure modular arithmetic on the absolute value; no calendar rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub overdue: bool,
}

impl TimeLeft {
    pub fn from_ms(ms: i64) -> Self {
        let abs = ms.unsigned_abs();
        Self {
            days: abs / MS_PER_DAY,
            hours: (abs / MS_PER_HOUR as u64) % 24,
            minutes: (abs / MS_PER_MINUTE as u64) % 60,
            seconds: (abs / MS_PER_SECOND) % 60,
            overdue: ms < 0,
        }
    }
}

impl fmt::Display for TimeLeft {
    /// `1d 2h 3m 4s`; days and hours are omitted when zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overdue {
            write!(f, "overdue ")?;
        }
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

/// Per-tick view of one active order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub order_id: String,
    pub remaining_ms: i64,
    pub urgency: Urgency,
    pub time_left: TimeLeft,
}

impl Countdown {
    pub fn label(&self) -> String {
        self.time_left.to_string()
    }
}
