//! # Orderboard Core Library
//!
//! This library provides the core logic for Orderboard, a scheduling board
//! for a small shop: work orders assigned to machines and operators, a
//! day timeline, live countdowns and one-shot overdue notifications. The
//! `orderboard` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Board**: the single state owner. Commands return [`Event`]s and saves
//!   are optimistic (local state first, persistence after)
//! - **Timer Engine**: a wall-clock-driven state machine; the caller invokes
//!   `tick()` periodically
//! - **Sync**: whole-document read/save against a spreadsheet web-app, the
//!   local SQLite store, or memory
//! - **Storage**: TOML configuration and a SQLite key/value cache
//! - **Timeline**: projection of orders onto a local day window
//!
//! ## Key Components
//!
//! - [`Board`]: state owner wiring everything together
//! - [`OrderStore`]: ordered order collection and lifecycle
//! - [`TimerEngine`]: countdowns and overdue detection
//! - [`SyncGateway`]: trait for board persistence backends
//! - [`Config`]: application configuration management

pub mod board;
pub mod duration;
pub mod error;
pub mod events;
pub mod migration;
pub mod notify;
pub mod order;
pub mod registry;
pub mod storage;
pub mod store;
pub mod sync;
pub mod timeline;
pub mod timer;

pub use board::{now_ms, run_timer, Board, SharedBoard};
pub use duration::{adjust_duration, format_duration, format_hours, parse_duration};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use events::Event;
pub use notify::{LogNotifier, Notification, Notifier, Permission, RecordingNotifier};
pub use order::{DurationUnit, NewOrder, Order, OrderResult, OrderStatus};
pub use registry::{ResourceRegistry, ResourceStatus};
pub use storage::{Config, Database, ResourceCache};
pub use store::OrderStore;
pub use sync::{HttpGateway, LocalGateway, MemoryGateway, Snapshot, SyncGateway};
pub use timeline::{GroupBy, TimelineBlock, TimelineRow, TimelineView};
pub use timer::{Countdown, TickReport, TimeLeft, TimerEngine, Urgency};
