//! Canonical identifiers
//!
//! Every entity type has exactly one identifier format, fixed at parse time:
//! - [`PageId`]: `page_<token>`
//! - [`QuestionId`]: `form_<token>`
//! - [`OptionId`]: `option_<token>`
//!
//! Parsing accepts a bare token (`"1700"`) and collapses repeated prefixes
//! (`"form_form_1700"`), so nothing downstream has to strip prefixes again.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifier parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Nothing left after trimming and prefix removal
    #[error("empty {kind} identifier")]
    Empty {
        /// Entity kind (`page`, `question`, `option`)
        kind: &'static str,
    },

    /// Identifier contains characters that cannot appear in a storage key
    #[error("invalid {kind} identifier: {raw:?}")]
    Invalid {
        /// Entity kind
        kind: &'static str,
        /// Rejected input
        raw: String,
    },
}

/// Strip whitespace and every leading copy of `prefix`.
fn strip_prefixes<'a>(raw: &'a str, prefix: &str) -> &'a str {
    let mut rest = raw.trim();
    while let Some(stripped) = rest.strip_prefix(prefix) {
        rest = stripped;
    }
    rest
}

fn normalize(raw: &str, prefix: &str, kind: &'static str) -> Result<String, IdError> {
    let token = strip_prefixes(raw, prefix);
    if token.is_empty() {
        return Err(IdError::Empty { kind });
    }
    if token
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '"'))
    {
        return Err(IdError::Invalid {
            kind,
            raw: raw.to_string(),
        });
    }
    Ok(format!("{prefix}{token}"))
}

/// First all-digit `_` segment after the prefix.
fn embedded_timestamp(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?
        .split('_')
        .find(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|segment| segment.parse().ok())
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Canonical prefix
            pub const PREFIX: &'static str = $prefix;

            /// Parse and normalise an identifier
            ///
            /// # Errors
            /// Returns [`IdError`] for empty or unusable input.
            pub fn parse(raw: &str) -> Result<Self, IdError> {
                normalize(raw, Self::PREFIX, $kind).map(Self)
            }

            /// Build an identifier from a creation timestamp
            #[inline]
            #[must_use]
            pub fn from_timestamp(millis: i64) -> Self {
                Self(format!("{}{}", Self::PREFIX, millis))
            }

            /// Canonical string form (also the storage key)
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Identifier without its prefix
            #[inline]
            #[must_use]
            pub fn token(&self) -> &str {
                &self.0[Self::PREFIX.len()..]
            }

            /// Creation timestamp embedded in the identifier, if any
            #[inline]
            #[must_use]
            pub fn timestamp(&self) -> Option<u64> {
                embedded_timestamp(&self.0, Self::PREFIX)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

prefixed_id!(
    /// Page identifier, `page_<timestamp>`
    PageId,
    "page_",
    "page"
);

prefixed_id!(
    /// Question identifier, `form_<timestamp>`
    ///
    /// Shares its namespace with the standalone storage key of the question.
    QuestionId,
    "form_",
    "question"
);

prefixed_id!(
    /// Option identifier, `option_<timestamp>_<random>`
    OptionId,
    "option_",
    "option"
);

impl OptionId {
    /// Build an option identifier from a timestamp and random suffix
    #[inline]
    #[must_use]
    pub fn from_parts(millis: i64, suffix: &str) -> Self {
        Self(format!("{}{}_{}", Self::PREFIX, millis, suffix))
    }
}
