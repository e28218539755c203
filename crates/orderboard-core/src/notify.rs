//! Notification surface.
//!
//! Delivery is gated on permission: without [`Permission::Granted`] a
//! notification is silently dropped, which is not an error.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

use crate::order::Order;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub order_id: String,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// The overdue notice for `order`.
    pub fn overdue(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            title: format!("Order overdue: {}", order.customer_name),
            body: format!("{} should be finished now!", order.order_details),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    #[default]
    Default,
}

#[derive(Error, Debug)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Something that can show a notification to the user.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Show the notification. Only called when permission is granted.
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Deliver through `notifier` if it has permission.
///
/// Returns `Ok(true)` if the notification was shown, `Ok(false)` if it was
/// suppressed.
pub fn dispatch(notifier: &dyn Notifier, notification: &Notification) -> Result<bool, NotifyError> {
    if notifier.permission() != Permission::Granted {
        return Ok(false);
    }
    notifier.deliver(notification)?;
    Ok(true)
}

/// Writes notifications as lines to a writer and to the log.
pub struct LogNotifier<W: Write + Send> {
    out: Mutex<W>,
    permission: Permission,
}

impl<W: Write + Send> LogNotifier<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self {
            out: Mutex::new(out),
            permission: if enabled {
                Permission::Granted
            } else {
                Permission::Denied
            },
        }
    }
}

impl<W: Write + Send> Notifier for LogNotifier<W> {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(order_id = %notification.order_id, title = %notification.title, "notification");
        let mut out = self
            .out
            .lock()
            .map_err(|_| NotifyError("output lock poisoned".into()))?;
        writeln!(out, "[notice] {}: {}", notification.title, notification.body)
            .map_err(|e| NotifyError(e.to_string()))
    }
}

/// Keeps every delivered notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    permission: Permission,
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn granted() -> Self {
        Self::with_permission(Permission::Granted)
    }

    pub fn with_permission(permission: Permission) -> Self {
        Self {
            permission,
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .map_err(|_| NotifyError("recording lock poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}
