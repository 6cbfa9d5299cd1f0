//! Field markup
//!
//! A single renderer backs the live editor preview, the page editor preview
//! and the form preview. Input `name` and `id` are the question id; option
//! inputs are `<id>-<index>` with hints at `<id>-<index>-hint`.

use crate::html::escape_html;
use fb_model::{FieldType, Question};
use serde::Deserialize;
use std::fmt::Write;

/// Heading shown for a question without a title
pub const PLACEHOLDER_TITLE: &str = "Question text";

/// Id used for drafts that have not been given one
pub const DRAFT_ID: &str = "question";

/// Unsaved question sent by the editor for a live preview
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDraft {
    /// Question id, when the editor has one
    #[serde(default)]
    pub id: Option<String>,
    /// Field type name; unknown names render a label only
    #[serde(default)]
    pub field_type: Option<String>,
    /// Question text
    #[serde(default)]
    pub title: String,
    /// Hint text
    #[serde(default)]
    pub hint: String,
    /// Options in display order
    #[serde(default)]
    pub options: Vec<DraftOption>,
}

/// Option of a [`PreviewDraft`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DraftOption {
    /// Label
    #[serde(default)]
    pub text: String,
    /// Submitted value
    #[serde(default)]
    pub value: String,
    /// Hint
    #[serde(default)]
    pub hint: String,
}

struct Choice<'a> {
    text: &'a str,
    value: &'a str,
    hint: &'a str,
}

impl<'a> Choice<'a> {
    fn new(text: &'a str, value: &'a str, hint: &'a str) -> Self {
        let value = if value.trim().is_empty() { text } else { value };
        Self { text, value, hint }
    }
}

struct Field<'a> {
    id: String,
    field_type: Option<FieldType>,
    title: &'a str,
    hint: &'a str,
    choices: Vec<Choice<'a>>,
}

/// Markup for a stored question
#[must_use]
pub fn render_field(question: &Question) -> String {
    Field {
        id: escape_html(question.id.as_str()),
        field_type: Some(question.field_type),
        title: &question.title,
        hint: &question.hint,
        choices: question
            .options
            .iter()
            .map(|o| Choice::new(&o.text, &o.value, &o.hint))
            .collect(),
    }
    .render()
}

/// Markup for an unsaved draft
#[must_use]
pub fn render_draft(draft: &PreviewDraft) -> String {
    let id = draft
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DRAFT_ID);
    let field_type = match draft.field_type.as_deref() {
        None | Some("") => Some(FieldType::Text),
        Some(raw) => raw.parse().ok(),
    };
    Field {
        id: escape_html(id),
        field_type,
        title: &draft.title,
        hint: &draft.hint,
        choices: draft
            .options
            .iter()
            .map(|o| Choice::new(&o.text, &o.value, &o.hint))
            .collect(),
    }
    .render()
}

impl Field<'_> {
    fn title(&self) -> String {
        let title = self.title.trim();
        escape_html(if title.is_empty() {
            PLACEHOLDER_TITLE
        } else {
            title
        })
    }

    fn has_hint(&self) -> bool {
        !self.hint.trim().is_empty()
    }

    fn described_by(&self) -> String {
        if self.has_hint() {
            format!(" aria-describedby=\"{}-hint\"", self.id)
        } else {
            String::new()
        }
    }

    fn hint_block(&self, out: &mut String) {
        if self.has_hint() {
            let _ = writeln!(
                out,
                "<div id=\"{}-hint\" class=\"govuk-hint\">{}</div>",
                self.id,
                escape_html(self.hint.trim())
            );
        }
    }

    fn render(&self) -> String {
        let mut out = String::from("<div class=\"govuk-form-group\">\n");
        match self.field_type {
            Some(t) if t.needs_fieldset() => self.fieldset(t, &mut out),
            _ => self.labelled(&mut out),
        }
        out.push_str("</div>\n");
        out
    }

    fn labelled(&self, out: &mut String) {
        let id = &self.id;
        let _ = writeln!(
            out,
            "<h1 class=\"govuk-label-wrapper\"><label class=\"govuk-label govuk-label--l\" for=\"{id}\">{}</label></h1>",
            self.title()
        );
        self.hint_block(out);
        let aria = self.described_by();
        let input = |class: &str, kind: &str| {
            format!("<input class=\"{class}\" id=\"{id}\" name=\"{id}\" type=\"{kind}\"{aria}>\n")
        };
        match self.field_type {
            Some(FieldType::Text) => out.push_str(&input("govuk-input", "text")),
            Some(FieldType::Email) => out.push_str(&input("govuk-input", "email")),
            Some(FieldType::Tel) => out.push_str(&input("govuk-input govuk-input--width-20", "tel")),
            Some(FieldType::Number) => {
                out.push_str(&input("govuk-input govuk-input--width-10", "number"));
            }
            Some(FieldType::File) => out.push_str(&input("govuk-file-upload", "file")),
            Some(FieldType::Textarea) => {
                let _ = writeln!(
                    out,
                    "<textarea class=\"govuk-textarea\" id=\"{id}\" name=\"{id}\" rows=\"5\"{aria}></textarea>"
                );
            }
            Some(FieldType::Select) => self.select(out, ""),
            Some(FieldType::Autocomplete) => self.select(out, " data-autocomplete"),
            _ => {}
        }
    }

    fn select(&self, out: &mut String, extra: &str) {
        let id = &self.id;
        let _ = writeln!(
            out,
            "<select class=\"govuk-select\" id=\"{id}\" name=\"{id}\"{}{extra}>",
            self.described_by()
        );
        out.push_str("<option value=\"\">Please select</option>\n");
        for choice in &self.choices {
            let _ = writeln!(
                out,
                "<option value=\"{}\">{}</option>",
                escape_html(choice.value),
                escape_html(choice.text)
            );
        }
        out.push_str("</select>\n");
    }

    fn fieldset(&self, field_type: FieldType, out: &mut String) {
        let role = if field_type == FieldType::Date {
            " role=\"group\""
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<fieldset class=\"govuk-fieldset\"{role}{}>",
            self.described_by()
        );
        let _ = writeln!(
            out,
            "<legend class=\"govuk-fieldset__legend govuk-fieldset__legend--l\"><h1 class=\"govuk-fieldset__heading\">{}</h1></legend>",
            self.title()
        );
        self.hint_block(out);
        match field_type {
            FieldType::Radio => self.choices(out, "radios", "radio"),
            FieldType::Checkbox => self.choices(out, "checkboxes", "checkbox"),
            _ => self.date(out),
        }
        out.push_str("</fieldset>\n");
    }

    fn choices(&self, out: &mut String, block: &str, kind: &str) {
        let id = &self.id;
        let _ = writeln!(
            out,
            "<div class=\"govuk-{block}\" data-module=\"govuk-{block}\">"
        );
        for (i, choice) in self.choices.iter().enumerate() {
            let has_hint = !choice.hint.trim().is_empty();
            let aria = if has_hint {
                format!(" aria-describedby=\"{id}-{i}-hint\"")
            } else {
                String::new()
            };
            let _ = writeln!(out, "<div class=\"govuk-{block}__item\">");
            let _ = writeln!(
                out,
                "<input class=\"govuk-{block}__input\" id=\"{id}-{i}\" name=\"{id}\" type=\"{kind}\" value=\"{}\"{aria}>",
                escape_html(choice.value)
            );
            let _ = writeln!(
                out,
                "<label class=\"govuk-label govuk-{block}__label\" for=\"{id}-{i}\">{}</label>",
                escape_html(choice.text)
            );
            if has_hint {
                let _ = writeln!(
                    out,
                    "<div id=\"{id}-{i}-hint\" class=\"govuk-hint govuk-{block}__hint\">{}</div>",
                    escape_html(choice.hint.trim())
                );
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    fn date(&self, out: &mut String) {
        let id = &self.id;
        let _ = writeln!(out, "<div class=\"govuk-date-input\" id=\"{id}\">");
        for (part, label, width) in [("day", "Day", 2), ("month", "Month", 2), ("year", "Year", 4)] {
            let _ = writeln!(
                out,
                "<div class=\"govuk-date-input__item\"><div class=\"govuk-form-group\">\
                 <label class=\"govuk-label govuk-date-input__label\" for=\"{id}-{part}\">{label}</label>\
                 <input class=\"govuk-input govuk-date-input__input govuk-input--width-{width}\" id=\"{id}-{part}\" name=\"{id}-{part}\" type=\"text\" pattern=\"[0-9]*\" inputmode=\"numeric\">\
                 </div></div>"
            );
        }
        out.push_str("</div>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_model::{OptionDraft, OptionId, PageId, QuestionId};

    fn question(field_type: FieldType) -> Question {
        Question::new(
            QuestionId::parse("form_1700").unwrap(),
            PageId::parse("page_1").unwrap(),
            field_type,
        )
    }

    #[test]
    fn radio_inputs_share_question_name() {
        let mut q = question(FieldType::Radio);
        q.title = "Do you agree?".into();
        q.options = vec![
            OptionDraft::new("Yes").into_option(OptionId::from_parts(1, "a")),
            OptionDraft::new("No")
                .with_hint("You can change this later")
                .into_option(OptionId::from_parts(2, "b")),
        ];
        let html = render_field(&q);
        assert_eq!(html.matches("type=\"radio\"").count(), 2);
        assert_eq!(html.matches("name=\"form_1700\"").count(), 2);
        assert!(html.contains("id=\"form_1700-0\""));
        assert!(html.contains("value=\"Yes\""));
        assert!(html.contains("value=\"No\" aria-describedby=\"form_1700-1-hint\""));
        assert!(html.contains("<h1 class=\"govuk-fieldset__heading\">Do you agree?</h1>"));
    }

    #[test]
    fn blank_title_uses_placeholder() {
        let html = render_field(&question(FieldType::Text));
        assert!(html.contains(PLACEHOLDER_TITLE));
        assert!(!html.contains("aria-describedby"));
    }

    #[test]
    fn hint_is_referenced() {
        let mut q = question(FieldType::Email);
        q.hint = "We only use this to reply".into();
        let html = render_field(&q);
        assert!(html.contains("<div id=\"form_1700-hint\" class=\"govuk-hint\">"));
        assert!(html.contains("type=\"email\" aria-describedby=\"form_1700-hint\""));
    }

    #[test]
    fn select_and_autocomplete_list_options() {
        let mut q = question(FieldType::Autocomplete);
        q.options = vec![OptionDraft::new("Wales").into_option(OptionId::from_parts(1, "a"))];
        let html = render_field(&q);
        assert!(html.contains("data-autocomplete"));
        assert!(html.contains("<option value=\"\">Please select</option>"));
        assert!(html.contains("<option value=\"Wales\">Wales</option>"));
    }

    #[test]
    fn date_has_three_numeric_inputs() {
        let html = render_field(&question(FieldType::Date));
        assert_eq!(html.matches("inputmode=\"numeric\"").count(), 3);
        assert!(html.contains("govuk-input--width-4\" id=\"form_1700-year\""));
        assert!(html.contains("role=\"group\""));
    }

    #[test]
    fn widths_and_rows() {
        assert!(render_field(&question(FieldType::Tel)).contains("govuk-input--width-20"));
        assert!(render_field(&question(FieldType::Number)).contains("govuk-input--width-10"));
        assert!(render_field(&question(FieldType::Textarea)).contains("rows=\"5\""));
        assert!(render_field(&question(FieldType::File)).contains("govuk-file-upload"));
    }

    #[test]
    fn author_text_is_escaped() {
        let mut q = question(FieldType::Checkbox);
        q.title = "<script>alert(1)</script>".into();
        q.options = vec![OptionDraft::new("A & B").into_option(OptionId::from_parts(1, "a"))];
        let html = render_field(&q);
        assert!(!html.contains("<script>"));
        assert!(html.contains("A &amp; B"));
    }

    #[test]
    fn draft_matches_stored_rendering() {
        let mut q = question(FieldType::Radio);
        q.title = "Colour".into();
        q.options = vec![OptionDraft::new("Red").into_option(OptionId::from_parts(1, "a"))];
        let draft = PreviewDraft {
            id: Some("form_1700".into()),
            field_type: Some("radio".into()),
            title: "Colour".into(),
            hint: String::new(),
            options: vec![DraftOption {
                text: "Red".into(),
                ..DraftOption::default()
            }],
        };
        assert_eq!(render_draft(&draft), render_field(&q));
    }

    #[test]
    fn unknown_draft_type_renders_label_only() {
        let draft = PreviewDraft {
            field_type: Some("slider".into()),
            title: "Volume".into(),
            ..PreviewDraft::default()
        };
        let html = render_draft(&draft);
        assert!(html.contains("for=\"question\">Volume</label>"));
        assert!(!html.contains("<input"));
    }
}
