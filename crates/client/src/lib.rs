//! Async client for the printables storefront backend.
//!
//! - [`AdminClient`]: cached product/review/order reads and mutations that
//!   invalidate cache tags and publish banners on the notification bus.
//! - [`AuthSession`]: profile-based login state with background refresh.
//! - [`ProductEditor`]: the load/edit/submit lifecycle of one product.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod http;
pub mod multipart;
pub mod orders;
pub mod products;
pub mod reviews;

pub use admin::AdminClient;
pub use auth::{AuthSession, AuthStatus, User};
pub use cache::{CacheTag, QueryCache};
pub use config::{ClientConfig, ConfigError};
pub use editor::{EditorError, EditorState, ProductEditor};
pub use error::ClientError;
pub use http::ApiClient;
