//! Editor screens served by the HTTP shell
//!
//! Each function returns a complete HTML document. Forms post back to the
//! server; destructive actions go through [`confirm_page`].

use crate::field::render_field;
use crate::html::{disabled, encode_query, escape_html};
use crate::page::{render_page_preview, NO_PAGES};
use fb_model::{FieldType, Lists, OptionDraft, Page, PageId, Question, QuestionOption};
use std::fmt::Write;

/// Page editor table message for a page without questions
pub const NO_FIELDS: &str =
    "No fields added yet. Choose a field type above to add your first field.";

/// Option table message for a question without options
pub const NO_OPTIONS: &str = "No options added yet";

/// Wrap `body` in the service layout
#[must_use]
pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\" class=\"govuk-template\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} - Form builder</title>\n</head>\n\
         <body class=\"govuk-template__body\">\n\
         <header class=\"govuk-header\"><div class=\"govuk-header__container govuk-width-container\">\
         <a href=\"/pages\" class=\"govuk-header__link govuk-header__service-name\">Form builder</a>\
         </div></header>\n\
         <div class=\"govuk-width-container\">\n<main class=\"govuk-main-wrapper\" id=\"main-content\">\n\
         {body}</main>\n</div>\n</body>\n</html>\n",
        escape_html(title)
    )
}

fn back_link(href: &str, out: &mut String) {
    let _ = writeln!(
        out,
        "<a href=\"{}\" class=\"govuk-back-link\">Back</a>",
        escape_html(href)
    );
}

fn error_summary(error: Option<&str>, out: &mut String) {
    if let Some(message) = error {
        let _ = writeln!(
            out,
            "<div class=\"govuk-error-summary\" data-module=\"govuk-error-summary\">\
             <div role=\"alert\"><h2 class=\"govuk-error-summary__title\">There is a problem</h2>\
             <div class=\"govuk-error-summary__body\"><p class=\"govuk-body\">{}</p></div></div></div>",
            escape_html(message)
        );
    }
}

fn post_button(action: &str, label: &str, class: &str, is_disabled: bool, out: &mut String) {
    let _ = writeln!(
        out,
        "<form method=\"post\" action=\"{}\" class=\"govuk-!-display-inline-block\">\
         <button type=\"submit\" class=\"govuk-button {class} govuk-button--small\"{}>{label}</button></form>",
        escape_html(action),
        disabled(is_disabled)
    );
}

fn text_input(name: &str, label: &str, value: &str, out: &mut String) {
    let _ = writeln!(
        out,
        "<div class=\"govuk-form-group\"><label class=\"govuk-label\" for=\"{name}\">{label}</label>\
         <input class=\"govuk-input\" id=\"{name}\" name=\"{name}\" type=\"text\" value=\"{}\"></div>",
        escape_html(value)
    );
}

fn hidden(name: &str, value: &str, out: &mut String) {
    let _ = writeln!(
        out,
        "<input type=\"hidden\" name=\"{name}\" value=\"{}\">",
        escape_html(value)
    );
}

/// Question editor location for `question`
#[must_use]
pub fn question_editor_url(question: &Question) -> String {
    format!(
        "/question-editor/{}/{}?pageId={}",
        question.field_type,
        question.id,
        encode_query(question.page_id.as_str())
    )
}

/// Page editor location
#[must_use]
pub fn page_editor_url(page_id: &PageId) -> String {
    format!("/page-editor/{page_id}")
}

/// List of all pages
#[must_use]
pub fn pages_list(pages: &[Page]) -> String {
    let mut body = String::from("<h1 class=\"govuk-heading-xl\">Pages</h1>\n");
    body.push_str(
        "<div class=\"govuk-button-group\">\
         <a href=\"/page-create\" role=\"button\" class=\"govuk-button\">Add a page</a>\
         <a href=\"/form-preview\" class=\"govuk-link\">Preview form</a></div>\n",
    );
    if pages.is_empty() {
        let _ = writeln!(body, "<p class=\"govuk-body\">{NO_PAGES}</p>");
        return layout("Pages", &body);
    }
    body.push_str(
        "<table class=\"govuk-table\"><thead class=\"govuk-table__head\"><tr class=\"govuk-table__row\">\
         <th class=\"govuk-table__header\">Page title</th>\
         <th class=\"govuk-table__header\"><span class=\"govuk-visually-hidden\">Actions</span></th>\
         </tr></thead>\n<tbody class=\"govuk-table__body\">\n",
    );
    for page in pages {
        let title = escape_html(&page.title);
        let _ = writeln!(
            body,
            "<tr class=\"govuk-table__row\" data-page-id=\"{id}\"><td class=\"govuk-table__cell\">{title}</td>\
             <td class=\"govuk-table__cell\">\
             <a href=\"/page-editor/{id}\" class=\"govuk-link govuk-!-margin-right-2\">Edit<span class=\"govuk-visually-hidden\"> {title}</span></a>\
             <form method=\"post\" action=\"/pages/{id}/delete\" class=\"govuk-!-display-inline-block\">\
             <button type=\"submit\" class=\"govuk-button govuk-button--warning govuk-button--small\">Delete<span class=\"govuk-visually-hidden\"> {title}</span></button>\
             </form></td></tr>",
            id = escape_html(page.id.as_str())
        );
    }
    body.push_str("</tbody></table>\n");
    layout("Pages", &body)
}

/// New page form
#[must_use]
pub fn page_create(error: Option<&str>) -> String {
    let mut body = String::new();
    back_link("/pages", &mut body);
    error_summary(error, &mut body);
    body.push_str(
        "<form method=\"post\" action=\"/page-create/save\" novalidate>\n\
         <div class=\"govuk-form-group\"><h1 class=\"govuk-label-wrapper\">\
         <label class=\"govuk-label govuk-label--l\" for=\"title\">What is the name of this page?</label></h1>\
         <input class=\"govuk-input\" id=\"title\" name=\"title\" type=\"text\"></div>\n\
         <button type=\"submit\" class=\"govuk-button\">Save and continue</button>\n</form>\n",
    );
    layout("Add a page", &body)
}

/// Page editor: question table, field actions and the page preview
#[must_use]
pub fn page_editor(page: &Page, questions: &[Question]) -> String {
    let page_id = escape_html(page.id.as_str());
    let mut body = String::new();
    back_link("/pages", &mut body);
    let _ = writeln!(
        body,
        "<h1 class=\"govuk-heading-xl\" data-page-title>Edit &quot;{}&quot;</h1>",
        escape_html(&page.title)
    );
    let _ = writeln!(
        body,
        "<a href=\"/field-types?pageId={}\" role=\"button\" class=\"govuk-button\">Add a field</a>",
        encode_query(page.id.as_str())
    );

    body.push_str(
        "<table class=\"govuk-table\" data-questions-table><thead class=\"govuk-table__head\"><tr class=\"govuk-table__row\">\
         <th class=\"govuk-table__header\">Question</th><th class=\"govuk-table__header\">Type</th>\
         <th class=\"govuk-table__header\"><span class=\"govuk-visually-hidden\">Actions</span></th></tr></thead>\n\
         <tbody class=\"govuk-table__body\">\n",
    );
    if questions.is_empty() {
        let _ = writeln!(
            body,
            "<tr class=\"govuk-table__row\"><td class=\"govuk-table__cell\" colspan=\"3\">\
             <p class=\"govuk-body govuk-!-margin-0\">{NO_FIELDS}</p></td></tr>"
        );
    }
    let last = questions.len().saturating_sub(1);
    for (index, question) in questions.iter().enumerate() {
        let qid = escape_html(question.id.as_str());
        let title = if question.title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            escape_html(&question.title)
        };
        let _ = write!(
            body,
            "<tr class=\"govuk-table__row\" data-question-id=\"{qid}\">\
             <td class=\"govuk-table__cell\"><a href=\"{}\" class=\"govuk-link\">{title}</a></td>\
             <td class=\"govuk-table__cell\">{}</td><td class=\"govuk-table__cell\"><div class=\"govuk-button-group\">\n",
            escape_html(&question_editor_url(question)),
            question.field_type.label()
        );
        let base = format!("/page-editor/{page_id}/questions/{qid}");
        post_button(
            &format!("{base}/move/up"),
            "↑<span class=\"govuk-visually-hidden\">Move up</span>",
            "govuk-button--secondary",
            index == 0,
            &mut body,
        );
        post_button(
            &format!("{base}/move/down"),
            "↓<span class=\"govuk-visually-hidden\">Move down</span>",
            "govuk-button--secondary",
            index == last,
            &mut body,
        );
        post_button(
            &format!("{base}/delete"),
            "Delete",
            "govuk-button--warning",
            false,
            &mut body,
        );
        body.push_str("</div></td></tr>\n");
    }
    body.push_str("</tbody></table>\n");

    body.push_str("<h2 class=\"govuk-heading-m\">Preview</h2>\n<div id=\"page-preview\">\n");
    body.push_str(&render_page_preview(page, questions));
    body.push_str("</div>\n");
    layout(&format!("Edit {}", page.title), &body)
}

/// Field type chooser for a new question
#[must_use]
pub fn field_type_chooser(page_id: &PageId) -> String {
    let mut body = String::new();
    back_link(&page_editor_url(page_id), &mut body);
    body.push_str("<h1 class=\"govuk-heading-xl\">What type of field do you need?</h1>\n");
    body.push_str("<ul class=\"govuk-list\" data-type-form>\n");
    let page_query = encode_query(page_id.as_str());
    for field_type in FieldType::ALL {
        let _ = writeln!(
            body,
            "<li><a class=\"govuk-link\" href=\"/question-editor/new/{field_type}?pageId={page_query}\">{}</a>\
             <p class=\"govuk-hint\">{}</p></li>",
            field_type.label(),
            field_type.description()
        );
    }
    body.push_str("</ul>\n");
    layout("Choose a field type", &body)
}

fn settings_inputs(question: &Question, out: &mut String) {
    let s = &question.settings;
    let get = |v: &Option<String>| v.clone().unwrap_or_default();
    match question.field_type {
        FieldType::Text | FieldType::Textarea | FieldType::Email | FieldType::Tel => {
            text_input("maxLength", "Maximum length (optional)", &get(&s.max_length), out);
            text_input("pattern", "Pattern (optional)", &get(&s.pattern), out);
        }
        FieldType::Number | FieldType::Date => {
            text_input("min", "Minimum (optional)", &get(&s.min), out);
            text_input("max", "Maximum (optional)", &get(&s.max), out);
        }
        FieldType::File => {
            text_input("accept", "Accepted file types (optional)", &get(&s.accept), out);
            text_input("maxSize", "Maximum size (optional)", &get(&s.max_size), out);
        }
        FieldType::Radio | FieldType::Checkbox | FieldType::Select | FieldType::Autocomplete => {}
    }
}

fn options_section(question: &Question, lists: &Lists, return_url: &str, out: &mut String) {
    let qid = escape_html(question.id.as_str());
    let editor_query = format!(
        "questionId={}&amp;pageId={}&amp;returnUrl={}",
        encode_query(question.id.as_str()),
        encode_query(question.page_id.as_str()),
        encode_query(return_url)
    );
    out.push_str("<h2 class=\"govuk-heading-m\">Options</h2>\n");
    out.push_str("<table class=\"govuk-table\" data-options-table><tbody class=\"govuk-table__body\">\n");
    if question.options.is_empty() {
        let _ = writeln!(
            out,
            "<tr class=\"govuk-table__row\"><td class=\"govuk-table__cell\" colspan=\"2\">\
             <p class=\"govuk-body\">{NO_OPTIONS}</p></td></tr>"
        );
    }
    let last = question.options.len().saturating_sub(1);
    for (index, option) in question.options.iter().enumerate() {
        let oid = escape_html(option.id.as_str());
        let text = escape_html(&option.text);
        let _ = write!(
            out,
            "<tr class=\"govuk-table__row\" data-option-id=\"{oid}\"><td class=\"govuk-table__cell\">\
             <p class=\"govuk-body govuk-!-margin-0\" data-option-text>{text}</p></td>\
             <td class=\"govuk-table__cell govuk-table__cell--numeric\"><div class=\"govuk-button-group\">\n"
        );
        let base = format!("/question-editor/{qid}/options/{oid}");
        post_button(
            &format!("{base}/move/up"),
            "↑<span class=\"govuk-visually-hidden\">Move up</span>",
            "govuk-button--secondary",
            index == 0,
            out,
        );
        post_button(
            &format!("{base}/move/down"),
            "↓<span class=\"govuk-visually-hidden\">Move down</span>",
            "govuk-button--secondary",
            index == last,
            out,
        );
        let _ = writeln!(
            out,
            "<a href=\"/option-editor/{}/{oid}?{editor_query}\" role=\"button\" class=\"govuk-button govuk-button--secondary govuk-button--small\">\
             Edit<span class=\"govuk-visually-hidden\"> {text}</span></a>",
            question.field_type
        );
        post_button(
            &format!("{base}/delete"),
            &format!("Delete<span class=\"govuk-visually-hidden\"> {text}</span>"),
            "govuk-button--warning",
            false,
            out,
        );
        out.push_str("</div></td></tr>\n");
    }
    out.push_str("</tbody></table>\n");
    let _ = writeln!(
        out,
        "<a href=\"/option-editor/{}?{editor_query}\" role=\"button\" class=\"govuk-button govuk-button--secondary\">Add option</a>",
        question.field_type
    );

    if !lists.is_empty() {
        let _ = writeln!(
            out,
            "<form method=\"post\" action=\"/question-editor/{qid}/import\">\
             <div class=\"govuk-form-group\"><label class=\"govuk-label\" for=\"listId\">Import options from a list</label>\
             <select class=\"govuk-select\" id=\"listId\" name=\"listId\">"
        );
        for (list_id, list) in lists {
            let _ = writeln!(
                out,
                "<option value=\"{}\">{}</option>",
                escape_html(list_id),
                escape_html(&list.name)
            );
        }
        out.push_str(
            "</select></div>\n<div class=\"govuk-radios govuk-radios--inline\" data-module=\"govuk-radios\">\
             <div class=\"govuk-radios__item\"><input class=\"govuk-radios__input\" id=\"mode-append\" name=\"mode\" type=\"radio\" value=\"append\" checked>\
             <label class=\"govuk-label govuk-radios__label\" for=\"mode-append\">Add to existing options</label></div>\
             <div class=\"govuk-radios__item\"><input class=\"govuk-radios__input\" id=\"mode-replace\" name=\"mode\" type=\"radio\" value=\"replace\">\
             <label class=\"govuk-label govuk-radios__label\" for=\"mode-replace\">Replace existing options</label></div></div>\n\
             <button type=\"submit\" class=\"govuk-button govuk-button--secondary\">Import</button>\n</form>\n",
        );
    }
}

/// Question editor with settings, options and a live preview
#[must_use]
pub fn question_editor(question: &Question, lists: &Lists, return_url: &str) -> String {
    let qid = escape_html(question.id.as_str());
    let mut body = String::new();
    back_link(return_url, &mut body);
    let _ = writeln!(
        body,
        "<span class=\"govuk-caption-l\">{} field</span>\n<h1 class=\"govuk-heading-xl\">Edit question</h1>",
        question.field_type.label()
    );
    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"/question-editor/{qid}/save\" data-question-form>"
    );
    hidden("pageId", question.page_id.as_str(), &mut body);
    hidden("fieldType", question.field_type.as_str(), &mut body);
    hidden("returnUrl", return_url, &mut body);
    hidden(
        "options",
        &serde_json::to_string(&question.options).unwrap_or_default(),
        &mut body,
    );
    text_input("title", "Question text", &question.title, &mut body);
    text_input("hint", "Hint text (optional)", &question.hint, &mut body);
    settings_inputs(question, &mut body);
    body.push_str("<button type=\"submit\" class=\"govuk-button\">Save question</button>\n</form>\n");

    if question.field_type.is_choice() {
        options_section(question, lists, &question_editor_url(question), &mut body);
    }

    let _ = writeln!(
        body,
        "<h2 class=\"govuk-heading-m\">Preview</h2>\n<div data-question-preview=\"{qid}\">"
    );
    body.push_str(&render_field(question));
    body.push_str("</div>\n");
    layout("Edit question", &body)
}

/// State of the option editor form
#[derive(Debug, Clone)]
pub struct OptionForm<'a> {
    /// Owning question
    pub question: &'a Question,
    /// Option being edited; `None` for a new option
    pub option: Option<&'a QuestionOption>,
    /// Where to go after saving
    pub return_url: &'a str,
    /// Values to show; defaults to the option's current values
    pub values: Option<&'a OptionDraft>,
    /// Validation message
    pub error: Option<&'a str>,
}

/// Option editor
#[must_use]
pub fn option_editor(form: &OptionForm<'_>) -> String {
    let question = form.question;
    let target = form.option.map_or("new", |o| o.id.as_str());
    let (text, value, hint) = match (form.values, form.option) {
        (Some(d), _) => (d.text.as_str(), d.value.as_str(), d.hint.as_str()),
        (None, Some(o)) => (o.text.as_str(), o.value.as_str(), o.hint.as_str()),
        (None, None) => ("", "", ""),
    };

    let mut body = String::new();
    back_link(form.return_url, &mut body);
    error_summary(form.error, &mut body);
    let heading = if form.option.is_some() {
        "Edit option"
    } else {
        "Add an option"
    };
    let _ = writeln!(body, "<h1 class=\"govuk-heading-xl\">{heading}</h1>");
    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"/option-editor/{}/save\" novalidate>",
        escape_html(target)
    );
    hidden("questionId", question.id.as_str(), &mut body);
    hidden("pageId", question.page_id.as_str(), &mut body);
    hidden("fieldType", question.field_type.as_str(), &mut body);
    hidden("returnUrl", form.return_url, &mut body);
    text_input("text", "Option text", text, &mut body);
    text_input("value", "Value (optional)", value, &mut body);
    text_input("hint", "Hint text (optional)", hint, &mut body);
    body.push_str("<button type=\"submit\" class=\"govuk-button\">Save option</button>\n</form>\n");
    layout(heading, &body)
}

/// Two-step confirmation for a destructive action
///
/// Posting the form repeats the action with `confirm=yes` plus `fields`.
#[must_use]
pub fn confirm_page(prompt: &str, action: &str, fields: &[(&str, &str)], cancel_url: &str) -> String {
    let mut body = String::new();
    back_link(cancel_url, &mut body);
    let _ = writeln!(
        body,
        "<h1 class=\"govuk-heading-l\">{}</h1>\n<form method=\"post\" action=\"{}\">",
        escape_html(prompt),
        escape_html(action)
    );
    hidden("confirm", "yes", &mut body);
    for (name, value) in fields {
        hidden(name, value, &mut body);
    }
    let _ = writeln!(
        body,
        "<div class=\"govuk-button-group\"><button type=\"submit\" class=\"govuk-button govuk-button--warning\">Yes, continue</button>\
         <a href=\"{}\" class=\"govuk-link\">Cancel</a></div>\n</form>",
        escape_html(cancel_url)
    );
    layout("Are you sure?", &body)
}

/// Missing page, question or option
#[must_use]
pub fn not_found(message: &str) -> String {
    let body = format!(
        "<h1 class=\"govuk-heading-l\">Page not found</h1>\n<p class=\"govuk-body\">{}</p>\n\
         <p class=\"govuk-body\"><a href=\"/pages\" class=\"govuk-link\">Go to pages list</a></p>\n",
        escape_html(message)
    );
    layout("Page not found", &body)
}

/// Raw dump of every stored record
#[must_use]
pub fn json_viewer(records: &[(String, serde_json::Value)]) -> String {
    let mut body = String::from("<h1 class=\"govuk-heading-xl\">Stored data</h1>\n");
    for (key, value) in records {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
        let _ = writeln!(
            body,
            "<h2 class=\"govuk-heading-s\">{}</h2>\n<pre class=\"govuk-body-s\">{}</pre>",
            escape_html(key),
            escape_html(&pretty)
        );
    }
    layout("Stored data", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_model::{default_lists, OptionId, QuestionId};

    fn page() -> Page {
        Page::new(PageId::from_timestamp(10), "Contact details")
    }

    fn radio(ts: i64, title: &str) -> Question {
        let mut q = Question::new(QuestionId::from_timestamp(ts), page().id, FieldType::Radio);
        q.title = title.into();
        q
    }

    #[test]
    fn page_editor_disables_boundary_moves() {
        let questions = vec![radio(11, "First"), radio(12, "Second")];
        let html = page_editor(&page(), &questions);
        let ups: Vec<_> = html.match_indices("Move up").collect();
        assert_eq!(ups.len(), 2);
        assert!(html.contains(
            "action=\"/page-editor/page_10/questions/form_11/move/up\" class=\"govuk-!-display-inline-block\"><button type=\"submit\" class=\"govuk-button govuk-button--secondary govuk-button--small\" disabled>"
        ));
        assert!(html.contains(
            "action=\"/page-editor/page_10/questions/form_12/move/down\" class=\"govuk-!-display-inline-block\"><button type=\"submit\" class=\"govuk-button govuk-button--secondary govuk-button--small\" disabled>"
        ));
        assert!(html.contains("Edit &quot;Contact details&quot;"));
    }

    #[test]
    fn empty_states() {
        assert!(page_editor(&page(), &[]).contains(NO_FIELDS));
        let q = radio(11, "Pick");
        assert!(question_editor(&q, &Lists::new(), "/page-editor/page_10").contains(NO_OPTIONS));
        assert!(pages_list(&[]).contains(NO_PAGES));
    }

    #[test]
    fn question_editor_offers_import_for_choice_types() {
        let mut q = radio(11, "Pick");
        q.options
            .push(OptionDraft::new("Yes").into_option(OptionId::from_parts(1, "abc")));
        let html = question_editor(&q, &default_lists(), "/page-editor/page_10");
        assert!(html.contains("action=\"/question-editor/form_11/import\""));
        assert!(html.contains("<option value=\"days\">Days of Week</option>"));
        assert!(html.contains("/question-editor/form_11/options/option_1_abc/delete"));
        assert!(html.contains(
            "name=\"options\" value=\"[{&quot;id&quot;:&quot;option_1_abc&quot;,&quot;text&quot;:&quot;Yes&quot;"
        ));

        let mut text = q.clone();
        text.field_type = FieldType::Text;
        let html = question_editor(&text, &default_lists(), "/page-editor/page_10");
        assert!(!html.contains("/import"));
        assert!(html.contains("name=\"maxLength\""));
    }

    #[test]
    fn option_editor_keeps_submitted_values_on_error() {
        let q = radio(11, "Pick");
        let draft = OptionDraft::new("").with_hint("kept");
        let html = option_editor(&OptionForm {
            question: &q,
            option: None,
            return_url: "/question-editor/radio/form_11?pageId=page_10",
            values: Some(&draft),
            error: Some("Option text is required"),
        });
        assert!(html.contains("action=\"/option-editor/new/save\""));
        assert!(html.contains("Option text is required"));
        assert!(html.contains("value=\"kept\""));
    }

    #[test]
    fn confirmation_carries_fields() {
        let html = confirm_page(
            "Are you sure you want to delete this option?",
            "/question-editor/form_1/options/option_1_a/delete",
            &[("returnUrl", "/x")],
            "/x",
        );
        assert!(html.contains("name=\"confirm\" value=\"yes\""));
        assert!(html.contains("name=\"returnUrl\" value=\"/x\""));
    }
}
