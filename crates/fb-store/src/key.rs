//! Storage key namespaces

use fb_model::{PageId, QuestionId};
use std::fmt::{self, Display, Formatter};

/// Key of the lists record
pub const LISTS_KEY: &str = "lists";

/// Typed storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// `page_<ts>`
    Page(PageId),
    /// `form_<ts>`
    Question(QuestionId),
    /// `lists`
    Lists,
}

impl RecordKey {
    /// Key string as stored
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RecordKey::Page(id) => id.as_str(),
            RecordKey::Question(id) => id.as_str(),
            RecordKey::Lists => LISTS_KEY,
        }
    }

    /// Classify a raw key; unrelated keys give `None`
    #[must_use]
    pub fn classify(raw: &str) -> Option<RecordKey> {
        if raw == LISTS_KEY {
            Some(RecordKey::Lists)
        } else if raw.starts_with(PageId::PREFIX) {
            PageId::parse(raw).ok().map(RecordKey::Page)
        } else if raw.starts_with(QuestionId::PREFIX) {
            QuestionId::parse(raw).ok().map(RecordKey::Question)
        } else {
            None
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PageId> for RecordKey {
    fn from(id: PageId) -> Self {
        RecordKey::Page(id)
    }
}

impl From<QuestionId> for RecordKey {
    fn from(id: QuestionId) -> Self {
        RecordKey::Question(id)
    }
}
