//! Resource registry.
//!
//! Resources are plain names (machines or operators). Orders reference them
//! by name only, so removing or renaming a resource leaves existing orders
//! pointing at a stale string.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::order::Order;

/// Resources a fresh board starts with.
pub const DEFAULT_RESOURCES: [&str; 3] = ["Machine A", "Machine B", "Operator C"];

/// Derived busy/idle state of one resource at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub name: String,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRegistry {
    names: Vec<String>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::from_names(DEFAULT_RESOURCES.iter().map(|s| s.to_string()))
    }
}

impl ResourceRegistry {
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Build a registry, dropping blanks and duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::empty();
        for name in names {
            registry.add(name);
        }
        registry
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Register a resource. Blank or already-present names are ignored;
    /// returns whether the registry changed.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        debug!(resource = name, "resource added");
        self.names.push(name.to_string());
        true
    }

    /// Unregister a resource. Orders that reference it are not touched.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        let removed = self.names.len() != before;
        if removed {
            debug!(resource = name, "resource removed");
        }
        removed
    }

    pub fn replace_all(&mut self, names: Vec<String>) {
        *self = Self::from_names(names);
    }

    /// Busy/idle status of every registered resource at `now_ms`, in
    /// registry order. A resource is busy while an active order assigned to
    /// it has `start_time <= now < due_time`.
    pub fn busy_status(&self, now_ms: i64, orders: &[Order]) -> Vec<ResourceStatus> {
        self.names
            .iter()
            .map(|name| ResourceStatus {
                name: name.clone(),
                busy: is_busy(name, now_ms, orders),
            })
            .collect()
    }
}

/// Whether `resource` has an active order covering `now_ms`.
pub fn is_busy(resource: &str, now_ms: i64, orders: &[Order]) -> bool {
    orders
        .iter()
        .any(|o| o.is_active() && o.resource == resource && o.covers(now_ms))
}
