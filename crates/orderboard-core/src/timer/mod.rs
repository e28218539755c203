mod countdown;
mod engine;

pub use countdown::{Countdown, TimeLeft, Urgency, DEFAULT_URGENT_THRESHOLD_MS};
pub use engine::{TickReport, TimerEngine};
