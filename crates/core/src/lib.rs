//! Domain logic for the printables admin toolkit.
//!
//! Everything here is pure and synchronous:
//!
//! - [`product`] / [`review`] / [`order`]: the catalog entities and API envelopes.
//! - [`defaults`]: fills partial product drafts with default values.
//! - [`schema`]: field-level validation of a draft.
//! - [`form`]: the single-owner edit state of one product.
//! - [`payload`]: multipart wire payload construction.
//! - [`listing`]: list-screen pagination, sorting and filters.

pub mod data_url;
pub mod defaults;
pub mod error;
pub mod form;
pub mod format;
pub mod listing;
pub mod order;
pub mod payload;
pub mod product;
pub mod reorder;
pub mod review;
pub mod schema;
pub mod types;
