//! Route handlers
//!
//! Forms post back and are answered with a redirect. Destructive actions
//! render a confirmation page first unless the form carries `confirm=yes`.

pub(crate) mod options;
pub(crate) mod pages;
pub(crate) mod preview;
pub(crate) mod questions;

use crate::error::{AppError, AppResult};
use crate::Builder;
use axum::response::{Html, IntoResponse, Redirect, Response};
use fb_core::{Command, Gate, Outcome};
use fb_model::{Direction, OptionId, PageId, QuestionId};
use fb_preview::views::confirm_page;
use serde::Deserialize;

/// Body of confirmable post buttons
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfirmForm {
    confirm: Option<String>,
    return_url: Option<String>,
}

/// Trimmed value, `None` when blank
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same-site path to return to, or `fallback`
pub(crate) fn return_or(candidate: Option<String>, fallback: String) -> String {
    non_empty(candidate)
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .unwrap_or(fallback)
}

pub(crate) fn to_pages() -> Response {
    Redirect::to("/pages").into_response()
}

pub(crate) fn parse_page(raw: &str) -> AppResult<PageId> {
    PageId::parse(raw).map_err(|_| AppError::not_found(format!("page not found: {raw}")))
}

pub(crate) fn parse_question(raw: &str) -> AppResult<QuestionId> {
    QuestionId::parse(raw).map_err(|_| AppError::not_found(format!("question not found: {raw}")))
}

pub(crate) fn parse_option(raw: &str) -> AppResult<OptionId> {
    OptionId::parse(raw).map_err(|_| AppError::not_found(format!("option not found: {raw}")))
}

pub(crate) fn parse_direction(raw: &str) -> AppResult<Direction> {
    raw.parse().map_err(AppError::NotFound)
}

/// Where a confirmation form posts and where cancelling goes
pub(crate) struct Prompt<'a> {
    pub(crate) action: &'a str,
    pub(crate) fields: &'a [(&'a str, &'a str)],
    pub(crate) cancel_url: &'a str,
}

pub(crate) enum Gated {
    Committed(Outcome),
    Ask(Response),
}

/// Request `command`; commit it if no confirmation is needed or `confirm` is `yes`
pub(crate) fn run_gated(
    builder: &Builder,
    command: Command,
    confirm: Option<&str>,
    prompt: &Prompt<'_>,
) -> AppResult<Gated> {
    match builder.request(command)? {
        Gate::Ready(confirmed) => Ok(Gated::Committed(builder.commit(confirmed)?)),
        Gate::NeedsConfirmation(pending) if confirm == Some("yes") => {
            Ok(Gated::Committed(builder.commit(pending.accept())?))
        }
        Gate::NeedsConfirmation(pending) => {
            let page = confirm_page(
                pending.prompt(),
                prompt.action,
                prompt.fields,
                prompt.cancel_url,
            );
            Ok(Gated::Ask(Html(page).into_response()))
        }
    }
}
