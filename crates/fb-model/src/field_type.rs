//! Field types supported by the builder and the preview renderer

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Unknown field type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: {0:?}")]
pub struct FieldTypeError(pub String);

/// Input kind of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single line text
    Text,
    /// Multi line text
    Textarea,
    /// Single choice
    Radio,
    /// Multiple choice
    Checkbox,
    /// Dropdown
    Select,
    /// Dropdown enhanced with type-ahead on the client
    Autocomplete,
    /// Day, month and year inputs
    Date,
    /// Email address
    Email,
    /// Telephone number
    Tel,
    /// Number
    Number,
    /// File upload
    File,
}

impl FieldType {
    /// Every field type, in chooser order
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Select,
        FieldType::Autocomplete,
        FieldType::Date,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Number,
        FieldType::File,
    ];

    /// Wire name (`radio`, `textarea`, ...)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Select => "select",
            FieldType::Autocomplete => "autocomplete",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Number => "number",
            FieldType::File => "file",
        }
    }

    /// Display name with the first letter capitalised
    #[must_use]
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// One line description for the field type chooser
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            FieldType::Text => "A single line of text",
            FieldType::Textarea => "Longer answers over several lines",
            FieldType::Radio => "Choose one option from a list",
            FieldType::Checkbox => "Choose one or more options from a list",
            FieldType::Select => "Choose one option from a dropdown",
            FieldType::Autocomplete => "Dropdown that filters as you type",
            FieldType::Date => "Day, month and year",
            FieldType::Email => "An email address",
            FieldType::Tel => "A telephone number",
            FieldType::Number => "A whole or decimal number",
            FieldType::File => "Upload a file",
        }
    }

    /// Whether the answer is picked from options
    #[inline]
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            FieldType::Radio | FieldType::Checkbox | FieldType::Select | FieldType::Autocomplete
        )
    }

    /// Whether the field renders inside a fieldset with a legend
    #[inline]
    #[must_use]
    pub fn needs_fieldset(self) -> bool {
        matches!(self, FieldType::Radio | FieldType::Checkbox | FieldType::Date)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FieldTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        for t in FieldType::ALL {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
        }
        assert_eq!(" Radio ".parse::<FieldType>().unwrap(), FieldType::Radio);
        assert!("slider".parse::<FieldType>().is_err());
    }

    #[test]
    fn choice_types() {
        assert!(FieldType::Radio.is_choice());
        assert!(FieldType::Autocomplete.is_choice());
        assert!(!FieldType::Date.is_choice());
        assert!(FieldType::Date.needs_fieldset());
    }

    #[test]
    fn label_capitalises() {
        assert_eq!(FieldType::Textarea.label(), "Textarea");
        assert_eq!(FieldType::Tel.label(), "Tel");
    }
}
