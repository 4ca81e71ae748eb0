//! Order e-mails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use inventory_store::{OrderId, OrderRecord};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Notification failed: {0}")]
pub struct NotificationError(pub String);

/// Sends e-mails about newly placed orders.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Order confirmation to the customer.
    async fn send_confirmation(&self, order: &OrderRecord) -> Result<(), NotificationError>;

    /// New-order alert to the shop staff.
    async fn send_admin_notification(&self, order: &OrderRecord)
    -> Result<(), NotificationError>;
}

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    admin_email: String,
}

impl LogNotifier {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new("orders@localhost")
    }
}

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn send_confirmation(&self, order: &OrderRecord) -> Result<(), NotificationError> {
        tracing::info!(
            order_id = %order.id,
            to = %order.email,
            total = %order.total,
            "Order confirmation sent"
        );
        Ok(())
    }

    async fn send_admin_notification(
        &self,
        order: &OrderRecord,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            order_id = %order.id,
            to = %self.admin_email,
            items = order.items.len(),
            "New order notification sent"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Confirmation,
    Admin,
}

/// Records notifications in memory, with a switch to make sending fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(NotificationKind, OrderId)>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(NotificationKind, OrderId)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, kind: NotificationKind, order: &OrderRecord) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError("mail server unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, order.id));
        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn send_confirmation(&self, order: &OrderRecord) -> Result<(), NotificationError> {
        self.record(NotificationKind::Confirmation, order)
    }

    async fn send_admin_notification(
        &self,
        order: &OrderRecord,
    ) -> Result<(), NotificationError> {
        self.record(NotificationKind::Admin, order)
    }
}
