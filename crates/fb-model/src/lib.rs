//! Form builder data model
//!
//! Entities persisted by the form builder:
//! - Pages, each owning an ordered list of questions
//! - Questions, stored standalone and embedded in their page
//! - Options, embedded in their question
//! - Predefined option lists for import
//!
//! Identifiers are normalised once at parse time; see [`ids`].

#![warn(unreachable_pub)]

pub mod entities;
pub mod field_type;
pub mod ids;
pub mod lists;

pub use entities::{
    Direction, FieldSettings, OptionDraft, Page, Question, QuestionOption, QuestionPatch,
    QuestionRecord, QuestionState, RecordDefect,
};
pub use field_type::{FieldType, FieldTypeError};
pub use ids::{IdError, OptionId, PageId, QuestionId};
pub use lists::{default_lists, ListOption, Lists, OptionList};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the data model
    pub use crate::{
        Direction, FieldType, OptionDraft, OptionId, Page, PageId, Question, QuestionId,
        QuestionOption, QuestionPatch, QuestionRecord,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
