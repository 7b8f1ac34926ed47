//! User-facing notification channel.
//!
//! - [`NotificationBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Mutations publish success/error banners here,
//!   decoupled from whoever triggered them.
//! - [`NotificationLog`]: background subscriber that writes every
//!   notification to the tracing log.

pub mod bus;
pub mod log;

pub use bus::{Notification, NotificationBus, NotificationVariant};
pub use log::NotificationLog;
