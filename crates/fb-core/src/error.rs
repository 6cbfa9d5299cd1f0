//! Error types for the builder services
//!
//! Three families reach callers:
//! - Validation: the write was refused and the message is meant for the author
//! - Missing references: a page, question, option or list does not exist
//! - Storage: the backend failed

use fb_model::{OptionId, PageId, QuestionId};
use fb_reconcile::MergeRejected;
use fb_store::StoreError;

/// Builder service error
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// Input rejected before any write
    #[error("{0}")]
    Validation(String),

    /// Merge refused the write
    #[error("{0}")]
    Merge(#[from] MergeRejected),

    /// Destructive action attempted without confirmation
    #[error("confirmation required: {prompt}")]
    ConfirmationRequired {
        /// Question to put to the author
        prompt: String,
    },

    /// No such page
    #[error("page not found: {0}")]
    PageNotFound(PageId),

    /// No such question
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// No such option on the question
    #[error("option {option} not found on {question}")]
    OptionNotFound {
        /// Owning question
        question: QuestionId,
        /// Missing option
        option: OptionId,
    },

    /// No such predefined list
    #[error("list not found: {0}")]
    ListNotFound(String),

    /// Backend failure
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl BuilderError {
    /// Create a validation error
    #[inline]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// A referenced entity does not exist
    #[inline]
    #[must_use]
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Self::PageNotFound(_)
                | Self::QuestionNotFound(_)
                | Self::OptionNotFound { .. }
                | Self::ListNotFound(_)
        )
    }

    /// The message can be shown to the author as is
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Merge(_) | Self::ConfirmationRequired { .. }
        ) || matches!(self, Self::Store(e) if e.is_rejection())
    }
}

/// Result alias for builder operations
pub type Result<T> = std::result::Result<T, BuilderError>;
