//! Page and whole-form previews

use crate::field::render_field;
use crate::html::{disabled, escape_html};
use fb_model::{Page, Question};
use std::fmt::Write;

/// Shown by the page editor preview when a page has no questions
pub const EMPTY_PAGE_PREVIEW: &str = "No fields added yet. Your form preview will appear here.";

/// Shown by the form preview for a page without questions
pub const EMPTY_FORM_PAGE: &str = "No questions on this page yet.";

/// Shown when there are no pages at all
pub const NO_PAGES: &str = "No pages added yet. Click 'Add a page' to create your first page.";

/// Heading for a page without a title
pub const UNTITLED_PAGE: &str = "Untitled Page";

/// A page with its resolved questions
#[derive(Debug, Clone, PartialEq)]
pub struct FormPage {
    /// Page record
    pub page: Page,
    /// Questions in display order
    pub questions: Vec<Question>,
}

fn page_title(page: &Page) -> String {
    let title = page.title.trim();
    escape_html(if title.is_empty() { UNTITLED_PAGE } else { title })
}

/// Preview pane of the page editor
#[must_use]
pub fn render_page_preview(page: &Page, questions: &[Question]) -> String {
    if questions.is_empty() {
        return format!("<div class=\"govuk-body\">\n<p>{EMPTY_PAGE_PREVIEW}</p>\n</div>\n");
    }
    let mut out = String::from("<div class=\"govuk-!-margin-bottom-6\">\n");
    if !page.title.trim().is_empty() {
        let _ = writeln!(
            out,
            "<h1 class=\"govuk-heading-l\">{}</h1>",
            escape_html(page.title.trim())
        );
    }
    for question in questions {
        out.push_str(&render_field(question));
    }
    out.push_str("</div>\n");
    out
}

/// One page of the form preview with breadcrumbs and navigation
///
/// `index` is clamped to the last page. The first page has no active
/// previous button; the last page's button reads `Submit`.
#[must_use]
pub fn render_form_preview(pages: &[FormPage], index: usize) -> String {
    let Some(last) = pages.len().checked_sub(1) else {
        return format!("<p class=\"govuk-body\">{NO_PAGES}</p>\n");
    };
    let index = index.min(last);
    let current = &pages[index];
    let title = page_title(&current.page);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div class=\"govuk-breadcrumbs\"><ol class=\"govuk-breadcrumbs__list\">\
         <li class=\"govuk-breadcrumbs__list-item\"><a class=\"govuk-breadcrumbs__link\" href=\"/pages\">Pages list</a></li>\
         <li class=\"govuk-breadcrumbs__list-item\">Form preview</li>\
         <li class=\"govuk-breadcrumbs__list-item\">{title}</li></ol></div>"
    );
    let _ = writeln!(
        out,
        "<span class=\"govuk-caption-l\">Page {} of {}</span>",
        index + 1,
        pages.len()
    );
    let _ = writeln!(out, "<h1 class=\"govuk-heading-xl\">{title}</h1>");

    if current.questions.is_empty() {
        let _ = writeln!(out, "<p class=\"govuk-body\">{EMPTY_FORM_PAGE}</p>");
    } else {
        for question in &current.questions {
            out.push_str(&render_field(question));
        }
    }

    out.push_str("<div class=\"govuk-button-group\">\n");
    if index == 0 {
        let _ = writeln!(
            out,
            "<button type=\"button\" class=\"govuk-button govuk-button--secondary\" data-prev-page{}>Previous</button>",
            disabled(true)
        );
    } else {
        let _ = writeln!(
            out,
            "<a href=\"/form-preview?page={}\" role=\"button\" class=\"govuk-button govuk-button--secondary\" data-prev-page>Previous</a>",
            index - 1
        );
    }
    if index == last {
        let _ = writeln!(
            out,
            "<button type=\"button\" class=\"govuk-button\" data-next-page{}>Submit</button>",
            disabled(true)
        );
    } else {
        let _ = writeln!(
            out,
            "<a href=\"/form-preview?page={}\" role=\"button\" class=\"govuk-button\" data-next-page>Continue</a>",
            index + 1
        );
    }
    out.push_str("</div>\n");
    out
}
