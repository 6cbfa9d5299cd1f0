//! GOV.UK markup for the form builder
//!
//! - [`field`]: one renderer for every question preview
//! - [`page`]: page editor preview and the paged form preview
//! - [`views`]: editor screens
//!
//! Rendering is pure: callers pass resolved questions in display order.

#![warn(unreachable_pub)]

pub mod field;
pub mod html;
pub mod page;
pub mod views;

pub use field::{render_draft, render_field, DraftOption, PreviewDraft};
pub use html::escape_html;
pub use page::{render_form_preview, render_page_preview, FormPage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
