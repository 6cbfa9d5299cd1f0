//! Pages, questions and options
//!
//! Two shapes exist for a question:
//! - [`QuestionRecord`]: the lenient stored shape. Every field is optional so
//!   that partially written or legacy records still load.
//! - [`Question`]: the normalised view with typed identifiers and defaults
//!   applied. Serialises to the same JSON layout as the record.

use crate::field_type::FieldType;
use crate::ids::{IdError, OptionId, PageId, QuestionId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Page record: `{ id, title, questions }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier (also its storage key)
    pub id: PageId,
    /// Page heading
    #[serde(default)]
    pub title: String,
    /// Embedded question copies
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

impl Page {
    /// Empty page
    #[must_use]
    pub fn new(id: PageId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            questions: Vec::new(),
        }
    }

    /// Index of the embedded copy of `question_id`, matched on normalised id
    #[must_use]
    pub fn position_of(&self, question_id: &QuestionId) -> Option<usize> {
        self.questions
            .iter()
            .position(|q| q.question_id().as_ref() == Some(question_id))
    }

    /// Insert or replace the embedded copy of a question
    pub fn upsert_question(&mut self, question: &Question) {
        let record = QuestionRecord::from(question);
        match self.position_of(&question.id) {
            Some(index) => self.questions[index] = record,
            None => self.questions.push(record),
        }
    }

    /// Remove the embedded copy of a question; returns whether one was present
    pub fn remove_question(&mut self, question_id: &QuestionId) -> bool {
        let before = self.questions.len();
        self.questions
            .retain(|q| q.question_id().as_ref() != Some(question_id));
        before != self.questions.len()
    }
}

/// Per-type field settings saved by the question editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    /// Maximum answer length (text types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    /// Validation pattern (text types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum value (number, date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Maximum value (number, date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Accepted file types (file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Maximum upload size (file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,
}

impl FieldSettings {
    /// Field-wise overlay: every setting present in `newer` wins
    #[must_use]
    pub fn merged(&self, newer: &FieldSettings) -> FieldSettings {
        fn pick(old: &Option<String>, new: &Option<String>) -> Option<String> {
            new.clone().or_else(|| old.clone())
        }
        FieldSettings {
            max_length: pick(&self.max_length, &newer.max_length),
            pattern: pick(&self.pattern, &newer.pattern),
            min: pick(&self.min, &newer.min),
            max: pick(&self.max, &newer.max),
            accept: pick(&self.accept, &newer.accept),
            max_size: pick(&self.max_size, &newer.max_size),
        }
    }

    /// True when no setting is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == FieldSettings::default()
    }
}

/// Answer option of a choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option identifier
    pub id: OptionId,
    /// Label shown to the user
    #[serde(default)]
    pub text: String,
    /// Submitted value
    #[serde(default)]
    pub value: String,
    /// Hint shown under the label
    #[serde(default)]
    pub hint: String,
}

impl QuestionOption {
    /// Submitted value, falling back to the label when blank
    #[must_use]
    pub fn effective_value(&self) -> &str {
        if self.value.trim().is_empty() {
            &self.text
        } else {
            &self.value
        }
    }
}

/// Input for creating or editing an option
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDraft {
    /// Label (required)
    pub text: String,
    /// Submitted value; blank means "same as the label"
    #[serde(default)]
    pub value: String,
    /// Hint
    #[serde(default)]
    pub hint: String,
}

impl OptionDraft {
    /// Draft with the given label
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the submitted value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the hint
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Trimmed label, `None` when blank
    #[must_use]
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Materialise the draft under `id`; a blank value defaults to the text
    #[must_use]
    pub fn into_option(self, id: OptionId) -> QuestionOption {
        let text = self.text.trim().to_string();
        let value = match self.value.trim() {
            "" => text.clone(),
            v => v.to_string(),
        };
        QuestionOption {
            id,
            text,
            value,
            hint: self.hint.trim().to_string(),
        }
    }
}

/// Lifecycle state of an existing question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionState {
    /// Created, no title yet
    Draft,
    /// Title set
    Complete,
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the start
    Up,
    /// Towards the end
    Down,
}

impl Direction {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// The opposite direction
    #[must_use]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction: {other:?}")),
        }
    }
}

/// Normalised question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question identifier (also the standalone storage key)
    pub id: QuestionId,
    /// Owning page
    pub page_id: PageId,
    /// Input kind
    pub field_type: FieldType,
    /// Question text, empty while a draft
    pub title: String,
    /// Hint text
    pub hint: String,
    /// Answer options, in display order
    pub options: Vec<QuestionOption>,
    /// Explicit position within the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Editor settings
    #[serde(flatten)]
    pub settings: FieldSettings,
}

impl Question {
    /// Fresh draft question
    #[must_use]
    pub fn new(id: QuestionId, page_id: PageId, field_type: FieldType) -> Self {
        Self {
            id,
            page_id,
            field_type,
            title: String::new(),
            hint: String::new(),
            options: Vec::new(),
            position: None,
            settings: FieldSettings::default(),
        }
    }

    /// Draft until a title is set
    #[must_use]
    pub fn state(&self) -> QuestionState {
        if self.title.trim().is_empty() {
            QuestionState::Draft
        } else {
            QuestionState::Complete
        }
    }

    /// Whether the cleanup sweep discards this question
    ///
    /// Choice types survive while they still hold options.
    #[must_use]
    pub fn is_abandoned_draft(&self) -> bool {
        if self.state() == QuestionState::Complete {
            return false;
        }
        !self.field_type.is_choice() || self.options.is_empty()
    }

    /// Index of an option by id
    #[must_use]
    pub fn option_index(&self, option_id: &OptionId) -> Option<usize> {
        self.options.iter().position(|o| &o.id == option_id)
    }
}

/// Why a stored record could not become a [`Question`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefect {
    /// No `id` field
    #[error("record has no id")]
    MissingId,
    /// No `fieldType` field
    #[error("record {id} has no fieldType")]
    MissingFieldType {
        /// Record id
        id: String,
    },
    /// `fieldType` is not a known type
    #[error("record {id} has unknown fieldType {field_type:?}")]
    UnknownFieldType {
        /// Record id
        id: String,
        /// Stored value
        field_type: String,
    },
    /// No usable `pageId` and no fallback page
    #[error("record {id} has no pageId")]
    MissingPage {
        /// Record id
        id: String,
    },
    /// An identifier did not parse
    #[error(transparent)]
    Id(#[from] IdError),
}

/// Lenient stored question shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// Identifier as stored (may carry a repeated prefix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning page as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    /// Field type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Question text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Hint text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Answer options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    /// Explicit position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Editor settings
    #[serde(flatten)]
    pub settings: FieldSettings,
}

fn non_blank(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl QuestionRecord {
    /// Normalised identifier, if the record has a usable one
    #[must_use]
    pub fn question_id(&self) -> Option<QuestionId> {
        self.id.as_deref().and_then(|raw| QuestionId::parse(raw).ok())
    }

    /// Normalised owning page, if the record has a usable one
    #[must_use]
    pub fn page(&self) -> Option<PageId> {
        self.page_id.as_deref().and_then(|raw| PageId::parse(raw).ok())
    }

    /// Overlay the present, non-empty fields of `newer` onto this record
    #[must_use]
    pub fn overlaid_with(&self, newer: &QuestionRecord) -> QuestionRecord {
        fn text(old: &Option<String>, new: &Option<String>) -> Option<String> {
            if non_blank(new.as_ref()) {
                new.clone()
            } else {
                old.clone()
            }
        }
        let options = match &newer.options {
            Some(opts) if !opts.is_empty() => Some(opts.clone()),
            _ => self.options.clone(),
        };
        QuestionRecord {
            id: text(&self.id, &newer.id),
            page_id: text(&self.page_id, &newer.page_id),
            field_type: text(&self.field_type, &newer.field_type),
            title: text(&self.title, &newer.title),
            hint: text(&self.hint, &newer.hint),
            options,
            position: newer.position.or(self.position),
            settings: self.settings.merged(&newer.settings),
        }
    }

    /// Normalise into a [`Question`]
    ///
    /// A missing `pageId` is repaired to `fallback_page` when one is given,
    /// missing text fields become empty strings.
    ///
    /// # Errors
    /// Returns [`RecordDefect`] when the id, field type or owning page is
    /// missing or unusable.
    pub fn to_question(&self, fallback_page: Option<&PageId>) -> Result<Question, RecordDefect> {
        let raw_id = self.id.as_deref().ok_or(RecordDefect::MissingId)?;
        let id = QuestionId::parse(raw_id)?;

        let field_type = match self.field_type.as_deref() {
            None => {
                return Err(RecordDefect::MissingFieldType {
                    id: id.to_string(),
                })
            }
            Some(raw) => raw
                .parse::<FieldType>()
                .map_err(|_| RecordDefect::UnknownFieldType {
                    id: id.to_string(),
                    field_type: raw.to_string(),
                })?,
        };

        let page_id = match (self.page(), fallback_page) {
            (Some(page), _) => page,
            (None, Some(fallback)) => fallback.clone(),
            (None, None) => {
                return Err(RecordDefect::MissingPage {
                    id: id.to_string(),
                })
            }
        };

        Ok(Question {
            id,
            page_id,
            field_type,
            title: self.title.clone().unwrap_or_default(),
            hint: self.hint.clone().unwrap_or_default(),
            options: self.options.clone().unwrap_or_default(),
            position: self.position,
            settings: self.settings.clone(),
        })
    }
}

impl From<&Question> for QuestionRecord {
    fn from(q: &Question) -> Self {
        QuestionRecord {
            id: Some(q.id.to_string()),
            page_id: Some(q.page_id.to_string()),
            field_type: Some(q.field_type.as_str().to_string()),
            title: Some(q.title.clone()),
            hint: Some(q.hint.clone()),
            options: Some(q.options.clone()),
            position: q.position,
            settings: q.settings.clone(),
        }
    }
}

/// Typed partial update of a question
///
/// `None` leaves a field untouched. Successive patches combine with
/// [`QuestionPatch::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    /// New field type
    pub field_type: Option<FieldType>,
    /// New title
    pub title: Option<String>,
    /// New hint
    pub hint: Option<String>,
    /// New options (full replacement)
    pub options: Option<Vec<QuestionOption>>,
    /// New position
    pub position: Option<u32>,
    /// Settings to overlay
    pub settings: FieldSettings,
}

impl QuestionPatch {
    /// Empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the hint
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Set the field type
    #[must_use]
    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the position
    #[must_use]
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Overlay settings
    #[must_use]
    pub fn with_settings(mut self, settings: FieldSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Combine with a newer patch; fields set in `newer` win
    #[must_use]
    pub fn merge(self, newer: QuestionPatch) -> QuestionPatch {
        QuestionPatch {
            field_type: newer.field_type.or(self.field_type),
            title: newer.title.or(self.title),
            hint: newer.hint.or(self.hint),
            options: newer.options.or(self.options),
            position: newer.position.or(self.position),
            settings: self.settings.merged(&newer.settings),
        }
    }

    /// True when the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == QuestionPatch::default()
    }

    /// Record form addressed at `id`, with only the patched fields present
    #[must_use]
    pub fn to_record(&self, id: &QuestionId) -> QuestionRecord {
        QuestionRecord {
            id: Some(id.to_string()),
            page_id: None,
            field_type: self.field_type.map(|t| t.as_str().to_string()),
            title: self.title.clone(),
            hint: self.hint.clone(),
            options: self.options.clone(),
            position: self.position,
            settings: self.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page_id() -> PageId {
        PageId::parse("page_1").unwrap()
    }

    #[test]
    fn record_normalises_ids_and_repairs_page() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"id":"form_form_5","fieldType":"radio"}"#).unwrap();
        let q = record.to_question(Some(&page_id())).unwrap();
        assert_eq!(q.id.as_str(), "form_5");
        assert_eq!(q.page_id, page_id());
        assert_eq!(q.title, "");
        assert!(q.options.is_empty());
    }

    #[test]
    fn record_without_field_type_is_defective() {
        let record = QuestionRecord {
            id: Some("form_1".into()),
            ..QuestionRecord::default()
        };
        assert!(matches!(
            record.to_question(Some(&page_id())),
            Err(RecordDefect::MissingFieldType { .. })
        ));
        let unknown = QuestionRecord {
            field_type: Some("slider".into()),
            ..record
        };
        assert!(matches!(
            unknown.to_question(Some(&page_id())),
            Err(RecordDefect::UnknownFieldType { .. })
        ));
    }

    #[test]
    fn question_serialises_as_stored_layout() {
        let mut q = Question::new(
            QuestionId::parse("form_7").unwrap(),
            page_id(),
            FieldType::Text,
        );
        q.settings.max_length = Some("100".into());
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["pageId"], "page_1");
        assert_eq!(value["fieldType"], "text");
        assert_eq!(value["maxLength"], "100");
        assert!(value.get("position").is_none());

        let back: QuestionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.to_question(None).unwrap(), q);
    }

    #[test]
    fn overlay_prefers_non_empty_newer_fields() {
        let embedded = QuestionRecord {
            id: Some("form_1".into()),
            title: Some("Old".into()),
            hint: Some("Keep me".into()),
            ..QuestionRecord::default()
        };
        let standalone = QuestionRecord {
            id: Some("form_1".into()),
            title: Some("New".into()),
            hint: Some(String::new()),
            ..QuestionRecord::default()
        };
        let merged = embedded.overlaid_with(&standalone);
        assert_eq!(merged.title.as_deref(), Some("New"));
        assert_eq!(merged.hint.as_deref(), Some("Keep me"));
    }

    #[test]
    fn draft_state_and_sweep_rules() {
        let mut q = Question::new(
            QuestionId::parse("form_1").unwrap(),
            page_id(),
            FieldType::Radio,
        );
        assert_eq!(q.state(), QuestionState::Draft);
        assert!(q.is_abandoned_draft());

        q.options.push(OptionDraft::new("Yes").into_option(OptionId::from_parts(1, "a")));
        assert!(!q.is_abandoned_draft());

        q.field_type = FieldType::Text;
        assert!(q.is_abandoned_draft());

        q.title = "Name".into();
        assert_eq!(q.state(), QuestionState::Complete);
        assert!(!q.is_abandoned_draft());
    }

    #[test]
    fn option_value_defaults_to_text() {
        let opt = OptionDraft::new(" Yes ").into_option(OptionId::from_parts(1, "abc"));
        assert_eq!(opt.text, "Yes");
        assert_eq!(opt.value, "Yes");
        let opt = OptionDraft::new("No").with_value("n").into_option(OptionId::from_parts(2, "d"));
        assert_eq!(opt.effective_value(), "n");
    }

    #[test]
    fn later_patch_wins() {
        let first = QuestionPatch::new().with_title("A").with_hint("h");
        let second = QuestionPatch::new().with_title("B");
        let merged = first.merge(second);
        assert_eq!(merged.title.as_deref(), Some("B"));
        assert_eq!(merged.hint.as_deref(), Some("h"));
    }

    #[test]
    fn page_upsert_and_remove_match_normalised_ids() {
        let mut page = Page::new(page_id(), "Contact");
        page.questions.push(QuestionRecord {
            id: Some("form_form_3".into()),
            field_type: Some("text".into()),
            ..QuestionRecord::default()
        });
        let q = Question::new(QuestionId::parse("3").unwrap(), page_id(), FieldType::Email);
        page.upsert_question(&q);
        assert_eq!(page.questions.len(), 1);
        assert_eq!(page.questions[0].field_type.as_deref(), Some("email"));
        assert!(page.remove_question(&q.id));
        assert!(page.questions.is_empty());
    }
}
