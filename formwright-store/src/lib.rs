//! Value store for Formwright editing sessions.
//!
//! Holds the configuration value being edited as a `serde_json::Value` tree
//! and provides path-addressed reads and writes.
//!
//! # Architecture
//!
//! - Writes create missing intermediate mappings (`a.b.c = 1` on `{}` works)
//! - Every array carries a side table of [`formwright_types::ElementId`]s so
//!   elements keep their identity when siblings are removed or reordered
//! - The root is held behind an `Arc` and written copy-on-write, which makes
//!   [`ValueStore::snapshot`] O(1) and structure-sharing until the next write

mod error;
mod store;

pub use error::{StoreError, StoreResult};
pub use store::{StablePath, ValueStore};
