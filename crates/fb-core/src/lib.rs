//! Form builder services
//!
//! [`FormBuilder`] is the single writer for pages, questions and options:
//! - Pages: create, rename, list, delete with their questions
//! - Questions: create, merged read, patch, full save, reorder, draft sweep
//! - Options: create, edit, reorder, delete, import from predefined lists
//!
//! Deletions and replacing imports go through [`FormBuilder::request`] and
//! [`FormBuilder::commit`]. Text edits can be batched with [`Autosave`].

#![warn(unreachable_pub)]

pub mod autosave;
pub mod builder;
pub mod command;
pub mod config;
pub mod error;
pub mod ids;

pub use autosave::Autosave;
pub use builder::{FormBuilder, OPTION_TEXT_REQUIRED, PAGE_TITLE_REQUIRED};
pub use command::{
    Command, Confirmation, Confirmed, Gate, ImportMode, Outcome, DELETE_OPTION_PROMPT,
    DELETE_QUESTION_PROMPT, REPLACE_OPTIONS_PROMPT,
};
pub use config::{BuilderConfig, DEFAULT_AUTOSAVE_MS};
pub use error::{BuilderError, Result};
pub use ids::{Clock, IdGenerator, SystemClock};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the builder
    pub use crate::{
        Autosave, BuilderConfig, BuilderError, Command, FormBuilder, Gate, ImportMode, Outcome,
    };
    pub use fb_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
