//! Core types and errors for meshcache.
//!
//! This crate holds the pieces shared by every other meshcache crate:
//!
//! - **`errors`**: the `Error` enum and `Result` alias centralizing all
//!   failure modes of the cache core.
//! - **`snapshot`**: the immutable byte-buffer value type stored in and
//!   returned from caches.

pub mod errors;
pub mod snapshot;

pub use self::{
    errors::{BoxError, Error, Result},
    snapshot::Snapshot,
};
