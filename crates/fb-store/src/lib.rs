//! Record storage for the form builder
//!
//! Layers, bottom up:
//! - [`KvBackend`]: the storage port (memory and file backends)
//! - [`JsonStore`]: JSON parsing and serialisation with forgiving reads
//! - [`Repository`]: typed page and question records behind the write gate
//! - [`ListCatalog`]: the predefined option lists

#![warn(unreachable_pub)]

pub mod backend;
pub mod error;
pub mod json;
pub mod key;
pub mod lists;
pub mod repository;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::{Result, StoreError};
pub use json::JsonStore;
pub use key::{RecordKey, LISTS_KEY};
pub use lists::ListCatalog;
pub use repository::Repository;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
