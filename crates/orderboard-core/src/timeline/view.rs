//! Timeline view state: which day is shown and how far it is zoomed.

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::layout::{DayWindow, HOURS_PER_DAY};

pub const MIN_ZOOM_HOURS: u8 = 4;
pub const MAX_ZOOM_HOURS: u8 = 24;
pub const DEFAULT_ZOOM_HOURS: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
    date: NaiveDate,
    /// Hours visible without scrolling.
    zoom_hours: u8,
}

impl TimelineView {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            zoom_hours: DEFAULT_ZOOM_HOURS,
        }
    }

    pub fn with_zoom(mut self, hours: u8) -> Self {
        self.set_zoom(hours);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn zoom_hours(&self) -> u8 {
        self.zoom_hours
    }

    /// Move the selected day forward or back.
    pub fn shift_days(&mut self, delta: i64) {
        if let Some(date) = self.date.checked_add_signed(Duration::days(delta)) {
            self.date = date;
        }
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Set the zoom, clamped to the supported range.
    pub fn set_zoom(&mut self, hours: u8) {
        self.zoom_hours = hours.clamp(MIN_ZOOM_HOURS, MAX_ZOOM_HOURS);
    }

    /// Step the zoom by `delta` hours. Returns whether the zoom changed.
    pub fn change_zoom(&mut self, delta: i8) -> bool {
        let next = (i16::from(self.zoom_hours) + i16::from(delta))
            .clamp(i16::from(MIN_ZOOM_HOURS), i16::from(MAX_ZOOM_HOURS)) as u8;
        if next == self.zoom_hours {
            return false;
        }
        self.zoom_hours = next;
        true
    }

    /// How much wider than the viewport the full day is drawn.
    pub fn scale_factor(&self) -> f64 {
        HOURS_PER_DAY / f64::from(self.zoom_hours)
    }

    pub fn window<Tz: TimeZone>(&self, tz: &Tz) -> Option<DayWindow> {
        DayWindow::for_date(self.date, tz)
    }

    /// Axis labels `00` through `24`.
    pub fn hour_marks() -> impl Iterator<Item = String> {
        (0..=24).map(|h| format!("{h:02}"))
    }
}
