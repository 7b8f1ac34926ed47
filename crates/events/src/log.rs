//! Writes bus notifications to the tracing log.

use tokio::sync::broadcast;

use crate::bus::{Notification, NotificationVariant};

/// Background subscriber that logs every notification it receives.
pub struct NotificationLog;

impl NotificationLog {
    /// Run until the bus is dropped.
    pub async fn run(mut receiver: broadcast::Receiver<Notification>) {
        loop {
            match receiver.recv().await {
                Ok(notification) => Self::write(&notification),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification log lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Notification bus closed");
                    break;
                }
            }
        }
    }

    fn write(notification: &Notification) {
        let message = notification.message.as_str();
        match notification.variant {
            NotificationVariant::Success | NotificationVariant::Info => {
                tracing::info!(%message, "notification")
            }
            NotificationVariant::Warning => tracing::warn!(%message, "notification"),
            NotificationVariant::Error => tracing::error!(%message, "notification"),
        }
    }
}
