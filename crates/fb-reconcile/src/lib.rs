//! Validation and reconciliation for form builder records
//!
//! - [`gate`]: shape checks and the option-preserving merge applied before writes
//! - [`reconciler`]: merged, ordered question views and single-step reordering
//!
//! Everything here is pure; storage lives in `fb-store`.

#![warn(unreachable_pub)]

pub mod gate;
pub mod reconciler;

pub use gate::{is_valid, safe_merge, MergeIntent, MergeOptions, MergeRejected};
pub use reconciler::{move_option, reorder, resolve_questions, sort_questions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
