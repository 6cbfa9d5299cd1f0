use super::{
    parse_direction, parse_page, parse_question, return_or, run_gated, ConfirmForm, Gated, Prompt,
};
use crate::error::AppResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use fb_core::{Command, Outcome};
use fb_preview::views;
use serde::Deserialize;

pub(crate) async fn index() -> Redirect {
    Redirect::to("/pages")
}

pub(crate) async fn list(State(state): State<AppState>) -> Html<String> {
    Html(views::pages_list(&state.builder().pages()))
}

pub(crate) async fn create_form() -> Html<String> {
    Html(views::page_create(None))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageForm {
    #[serde(default)]
    title: String,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> AppResult<Redirect> {
    if form.title.trim().is_empty() {
        return Ok(Redirect::to("/pages"));
    }
    let page = state.builder().create_page(&form.title)?;
    Ok(Redirect::to(&views::page_editor_url(&page.id)))
}

/// Page editor; abandoned drafts are swept before rendering
pub(crate) async fn editor(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> AppResult<Html<String>> {
    let page_id = parse_page(&page_id)?;
    for swept in state.builder().sweep_page(&page_id)? {
        state.autosave().cancel(&swept);
    }
    let page = state.builder().page(&page_id)?;
    let questions = state.builder().resolve_questions(&page_id)?;
    Ok(Html(views::page_editor(&page, &questions)))
}

pub(crate) async fn move_question(
    State(state): State<AppState>,
    Path((page_id, question_id, direction)): Path<(String, String, String)>,
) -> AppResult<Redirect> {
    let page_id = parse_page(&page_id)?;
    let question_id = parse_question(&question_id)?;
    let direction = parse_direction(&direction)?;
    state
        .builder()
        .move_question(&page_id, &question_id, direction)?;
    Ok(Redirect::to(&views::page_editor_url(&page_id)))
}

pub(crate) async fn delete_question(
    State(state): State<AppState>,
    Path((page_id, question_id)): Path<(String, String)>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Response> {
    let page_id = parse_page(&page_id)?;
    let question_id = parse_question(&question_id)?;
    let editor = return_or(form.return_url, views::page_editor_url(&page_id));
    let action = format!("/page-editor/{page_id}/questions/{question_id}/delete");
    let prompt = Prompt {
        action: &action,
        fields: &[("returnUrl", editor.as_str())],
        cancel_url: &editor,
    };
    let command = Command::DeleteQuestion(question_id.clone());
    match run_gated(state.builder(), command, form.confirm.as_deref(), &prompt)? {
        Gated::Committed(_) => {
            state.autosave().cancel(&question_id);
            Ok(Redirect::to(&editor).into_response())
        }
        Gated::Ask(page) => Ok(page),
    }
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Response> {
    let page_id = parse_page(&page_id)?;
    let action = format!("/pages/{page_id}/delete");
    let prompt = Prompt {
        action: &action,
        fields: &[],
        cancel_url: "/pages",
    };
    let command = Command::DeletePage(page_id);
    match run_gated(state.builder(), command, form.confirm.as_deref(), &prompt)? {
        Gated::Committed(Outcome::PageDeleted { questions, .. }) => {
            for question in &questions {
                state.autosave().cancel(question);
            }
            Ok(Redirect::to("/pages").into_response())
        }
        Gated::Committed(_) => Ok(Redirect::to("/pages").into_response()),
        Gated::Ask(page) => Ok(page),
    }
}
