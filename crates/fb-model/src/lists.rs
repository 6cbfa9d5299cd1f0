//! Predefined option lists
//!
//! Stored under the `lists` key as `{ <listId>: { name, options } }`. Order of
//! lists is preserved through [`IndexMap`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry of a predefined list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    /// Label
    pub text: String,
    /// Submitted value
    #[serde(default)]
    pub value: String,
    /// Hint
    #[serde(default)]
    pub hint: String,
}

impl ListOption {
    fn new(text: &str, value: &str, hint: &str) -> Self {
        Self {
            text: text.to_string(),
            value: value.to_string(),
            hint: hint.to_string(),
        }
    }
}

/// Named list of options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionList {
    /// Display name
    pub name: String,
    /// Entries in import order
    #[serde(default)]
    pub options: Vec<ListOption>,
}

/// All lists keyed by list id
pub type Lists = IndexMap<String, OptionList>;

/// Lists seeded into an empty store: `yes_no` and `days`
#[must_use]
pub fn default_lists() -> Lists {
    let mut lists = Lists::new();
    lists.insert(
        "yes_no".to_string(),
        OptionList {
            name: "Yes/No".to_string(),
            options: vec![
                ListOption::new("Yes", "yes", "Select this if you agree"),
                ListOption::new("No", "no", "Select this if you disagree"),
            ],
        },
    );
    lists.insert(
        "days".to_string(),
        OptionList {
            name: "Days of Week".to_string(),
            options: vec![
                ListOption::new("Monday", "mon", "Start of the work week"),
                ListOption::new("Tuesday", "tue", "Second day"),
                ListOption::new("Wednesday", "wed", "Middle of the week"),
                ListOption::new("Thursday", "thu", "Fourth day"),
                ListOption::new("Friday", "fri", "Last work day"),
                ListOption::new("Saturday", "sat", "Weekend starts"),
                ListOption::new("Sunday", "sun", "End of the week"),
            ],
        },
    );
    lists
}
