//! Write gate
//!
//! Two checks run before anything reaches storage:
//! - [`is_valid`]: structural shape of a record about to be written
//! - [`safe_merge`]: combines an incoming question with the stored one and
//!   refuses writes that would silently drop options

use fb_model::{FieldType, PageId, Question, QuestionId, QuestionRecord, RecordDefect};
use serde_json::Value;

/// Truthiness of a JSON value as the stored records use it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural check for page, question and option records
///
/// A record is accepted when it is an object with a truthy `id` and either
/// a `questions` array whose entries are all objects (page) or, when
/// present, an `options` array (question). Option records need only an id.
#[must_use]
pub fn is_valid(record: &Value) -> bool {
    let Value::Object(map) = record else {
        return false;
    };
    if !map.get("id").is_some_and(is_truthy) {
        return false;
    }
    if let Some(Value::Array(questions)) = map.get("questions") {
        return questions.iter().all(Value::is_object);
    }
    match map.get("options") {
        Some(options) if is_truthy(options) => options.is_array(),
        _ => true,
    }
}

/// Kind of write the incoming record represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeIntent {
    /// Partial update: absent fields carry over
    #[default]
    Patch,
    /// Full-record write: absent `options` over non-empty options is refused
    Replace,
}

/// Merge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    /// Write kind
    pub intent: MergeIntent,
    /// Caller confirmed emptying a non-empty option list
    pub confirm_clear: bool,
}

impl MergeOptions {
    /// Partial update
    #[inline]
    #[must_use]
    pub fn patch() -> Self {
        Self::default()
    }

    /// Full-record write
    #[inline]
    #[must_use]
    pub fn replace() -> Self {
        Self {
            intent: MergeIntent::Replace,
            confirm_clear: false,
        }
    }

    /// Allow emptying the options
    #[inline]
    #[must_use]
    pub fn with_confirmed_clear(mut self) -> Self {
        self.confirm_clear = true;
        self
    }
}

/// Reasons a merge refuses to produce a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeRejected {
    /// A new record lacks a required field
    #[error("new question record is missing {field}")]
    MissingField {
        /// Field name as stored
        field: &'static str,
    },

    /// A full write omitted the options of a question that has some
    #[error("write to {id} omits its options")]
    DestructiveOptionLoss {
        /// Question being written
        id: QuestionId,
    },

    /// A write empties the options without confirmation
    #[error("write to {id} would remove all options")]
    OptionsCleared {
        /// Question being written
        id: QuestionId,
    },

    /// Incoming record addresses a different question
    #[error("record for {incoming} cannot update {existing}")]
    IdMismatch {
        /// Stored question
        existing: QuestionId,
        /// Id carried by the incoming record
        incoming: String,
    },

    /// A field value is unusable
    #[error("invalid question record: {0}")]
    Invalid(#[from] RecordDefect),
}

/// Merge `incoming` over `existing`
///
/// Every field absent from `incoming` is carried over. Present fields
/// replace the stored value, including empty strings. A present but empty
/// `options` array over non-empty options needs
/// [`MergeOptions::confirm_clear`].
///
/// # Errors
/// Returns [`MergeRejected`] when the write would lose options or the
/// incoming record is incomplete or malformed.
pub fn safe_merge(
    existing: Option<&Question>,
    incoming: &QuestionRecord,
    options: MergeOptions,
) -> Result<Question, MergeRejected> {
    let Some(existing) = existing else {
        return create(incoming);
    };

    if let Some(raw) = incoming.id.as_deref() {
        if QuestionId::parse(raw).ok().as_ref() != Some(&existing.id) {
            return Err(MergeRejected::IdMismatch {
                existing: existing.id.clone(),
                incoming: raw.to_string(),
            });
        }
    }

    let mut merged = existing.clone();

    if let Some(raw) = incoming.page_id.as_deref() {
        merged.page_id = PageId::parse(raw).map_err(RecordDefect::from)?;
    }
    if let Some(raw) = incoming.field_type.as_deref() {
        merged.field_type =
            raw.parse::<FieldType>()
                .map_err(|_| RecordDefect::UnknownFieldType {
                    id: existing.id.to_string(),
                    field_type: raw.to_string(),
                })?;
    }
    if let Some(title) = &incoming.title {
        merged.title.clone_from(title);
    }
    if let Some(hint) = &incoming.hint {
        merged.hint.clone_from(hint);
    }

    match &incoming.options {
        None if options.intent == MergeIntent::Replace && !existing.options.is_empty() => {
            return Err(MergeRejected::DestructiveOptionLoss {
                id: existing.id.clone(),
            });
        }
        None => {}
        Some(new_options)
            if new_options.is_empty()
                && !existing.options.is_empty()
                && !options.confirm_clear =>
        {
            return Err(MergeRejected::OptionsCleared {
                id: existing.id.clone(),
            });
        }
        Some(new_options) => merged.options.clone_from(new_options),
    }

    if incoming.position.is_some() {
        merged.position = incoming.position;
    }
    merged.settings = existing.settings.merged(&incoming.settings);

    Ok(merged)
}

fn create(incoming: &QuestionRecord) -> Result<Question, MergeRejected> {
    if incoming.id.is_none() {
        return Err(MergeRejected::MissingField { field: "id" });
    }
    if incoming.page_id.is_none() {
        return Err(MergeRejected::MissingField { field: "pageId" });
    }
    if incoming.field_type.is_none() {
        return Err(MergeRejected::MissingField { field: "fieldType" });
    }
    Ok(incoming.to_question(None)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_model::{OptionDraft, OptionId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn question_with_options() -> Question {
        let mut q = Question::new(
            QuestionId::parse("q1").unwrap(),
            PageId::parse("p1").unwrap(),
            FieldType::Radio,
        );
        q.options = vec![
            OptionDraft::new("o1").into_option(OptionId::from_parts(1, "a")),
            OptionDraft::new("o2").into_option(OptionId::from_parts(2, "b")),
        ];
        q
    }

    #[test]
    fn page_shape_is_valid() {
        assert!(is_valid(&json!({"id": "page_1", "questions": []})));
        assert!(is_valid(&json!({"id": "page_1", "questions": [{"id": "form_1"}]})));
        assert!(!is_valid(&json!({"id": "page_1", "questions": [1, 2]})));
    }

    #[test]
    fn question_and_option_shapes_are_valid() {
        assert!(is_valid(&json!({"id": "form_1"})));
        assert!(is_valid(&json!({"id": "form_1", "options": []})));
        assert!(!is_valid(&json!({"id": "form_1", "options": "yes"})));
        assert!(is_valid(&json!({"id": "option_1_x", "text": "Yes"})));
    }

    #[test]
    fn records_without_id_are_invalid() {
        assert!(!is_valid(&json!({"questions": []})));
        assert!(!is_valid(&json!({"id": ""})));
        assert!(!is_valid(&json!([1, 2])));
        assert!(!is_valid(&Value::Null));
    }

    #[test]
    fn patch_preserves_absent_options() {
        let existing = question_with_options();
        let incoming = QuestionRecord {
            title: Some("new".into()),
            ..QuestionRecord::default()
        };
        let merged = safe_merge(Some(&existing), &incoming, MergeOptions::patch()).unwrap();
        assert_eq!(merged.title, "new");
        assert_eq!(merged.options, existing.options);
    }

    #[test]
    fn replace_rejects_absent_options() {
        let existing = question_with_options();
        let incoming = QuestionRecord {
            id: Some("form_q1".into()),
            title: Some("new".into()),
            ..QuestionRecord::default()
        };
        assert_eq!(
            safe_merge(Some(&existing), &incoming, MergeOptions::replace()),
            Err(MergeRejected::DestructiveOptionLoss {
                id: existing.id.clone()
            })
        );
    }

    #[test]
    fn emptying_options_needs_confirmation() {
        let existing = question_with_options();
        let incoming = QuestionRecord {
            options: Some(Vec::new()),
            ..QuestionRecord::default()
        };
        assert!(matches!(
            safe_merge(Some(&existing), &incoming, MergeOptions::patch()),
            Err(MergeRejected::OptionsCleared { .. })
        ));
        let merged = safe_merge(
            Some(&existing),
            &incoming,
            MergeOptions::patch().with_confirmed_clear(),
        )
        .unwrap();
        assert!(merged.options.is_empty());
    }

    #[test]
    fn new_record_needs_identity() {
        let incoming = QuestionRecord {
            id: Some("form_9".into()),
            field_type: Some("text".into()),
            ..QuestionRecord::default()
        };
        assert_eq!(
            safe_merge(None, &incoming, MergeOptions::patch()),
            Err(MergeRejected::MissingField { field: "pageId" })
        );
        let complete = QuestionRecord {
            page_id: Some("page_2".into()),
            ..incoming
        };
        let q = safe_merge(None, &complete, MergeOptions::patch()).unwrap();
        assert_eq!(q.page_id.as_str(), "page_2");
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let existing = question_with_options();
        let incoming = QuestionRecord {
            id: Some("form_other".into()),
            ..QuestionRecord::default()
        };
        assert!(matches!(
            safe_merge(Some(&existing), &incoming, MergeOptions::patch()),
            Err(MergeRejected::IdMismatch { .. })
        ));
    }

    #[test]
    fn settings_overlay_field_wise() {
        let mut existing = question_with_options();
        existing.settings.min = Some("1".into());
        let mut incoming = QuestionRecord::default();
        incoming.settings.max = Some("9".into());
        let merged = safe_merge(Some(&existing), &incoming, MergeOptions::patch()).unwrap();
        assert_eq!(merged.settings.min.as_deref(), Some("1"));
        assert_eq!(merged.settings.max.as_deref(), Some("9"));
    }
}
