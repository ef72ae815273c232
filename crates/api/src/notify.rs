//! Notification delivery.
//!
//! Manifests returned by the engine are handed to a [`Notifier`] on a
//! spawned task once the request's work has committed. Delivery failures are
//! logged and never reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use shiftdesk_core::notification::{Notification, Notifier};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Writes each notification to the log instead of a mail transport.
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            "Notification from {} to {} <{}>: {}",
            self.from,
            notification.recipient.display_name,
            notification.recipient.email,
            notification.subject()
        );
        debug!("Notification body:\n{}", notification.body());
        Ok(())
    }
}

/// Sends `notifications` in the background. The returned handle is only
/// useful to tests; callers are free to drop it.
pub fn dispatch(notifier: Arc<dyn Notifier>, notifications: Vec<Notification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        for notification in &notifications {
            if let Err(err) = notifier.send(notification).await {
                warn!(
                    "Failed to notify {} ({}): {:?}",
                    notification.recipient.email,
                    notification.subject(),
                    err
                );
            }
        }
    })
}
