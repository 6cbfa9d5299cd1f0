use super::{non_empty, parse_option, parse_question, return_or, to_pages};
use crate::error::AppResult;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use fb_core::BuilderError;
use fb_model::{OptionDraft, OptionId};
use fb_preview::views::{self, option_editor, OptionForm};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OptionQuery {
    question_id: Option<String>,
    page_id: Option<String>,
    return_url: Option<String>,
}

pub(crate) async fn create_form(
    State(state): State<AppState>,
    Path(_field_type): Path<String>,
    Query(query): Query<OptionQuery>,
) -> AppResult<Response> {
    editor_page(&state, query, None)
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    Path((_field_type, option_id)): Path<(String, String)>,
    Query(query): Query<OptionQuery>,
) -> AppResult<Response> {
    editor_page(&state, query, Some(&option_id))
}

fn editor_page(state: &AppState, query: OptionQuery, option_id: Option<&str>) -> AppResult<Response> {
    let (Some(question_id), Some(_)) = (non_empty(query.question_id), non_empty(query.page_id))
    else {
        return Ok(to_pages());
    };
    let question_id = parse_question(&question_id)?;
    let question = state.builder().question(&question_id)?;
    let option = match option_id {
        Some(raw) => {
            let option_id = parse_option(raw)?;
            let index = question
                .option_index(&option_id)
                .ok_or(BuilderError::OptionNotFound {
                    question: question_id,
                    option: option_id,
                })?;
            question.options.get(index)
        }
        None => None,
    };
    let return_url = return_or(query.return_url, views::question_editor_url(&question));
    let page = option_editor(&OptionForm {
        question: &question,
        option,
        return_url: &return_url,
        values: None,
        error: None,
    });
    Ok(Html(page).into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveOptionForm {
    question_id: Option<String>,
    return_url: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    hint: String,
}

/// Create or update an option
///
/// The path carries the option id, or `new`. An id the question does not
/// hold is created afresh.
pub(crate) async fn save(
    State(state): State<AppState>,
    Path(option_key): Path<String>,
    Form(form): Form<SaveOptionForm>,
) -> AppResult<Response> {
    let Some(question_id) = non_empty(form.question_id) else {
        return Ok(to_pages());
    };
    let question_id = parse_question(&question_id)?;
    let question = state.builder().question(&question_id)?;
    let return_url = return_or(form.return_url, views::question_editor_url(&question));

    let existing: Option<OptionId> = match option_key.as_str() {
        "new" => None,
        raw => OptionId::parse(raw)
            .ok()
            .filter(|id| question.option_index(id).is_some()),
    };
    let draft = OptionDraft {
        text: form.text,
        value: form.value,
        hint: form.hint,
    };
    let written = match &existing {
        Some(option_id) => state
            .builder()
            .update_option(&question_id, option_id, draft.clone()),
        None => state.builder().create_option(&question_id, draft.clone()),
    };

    match written {
        Ok(_) => Ok(Redirect::to(&return_url).into_response()),
        Err(BuilderError::Validation(message)) => {
            let option = existing
                .as_ref()
                .and_then(|id| question.option_index(id))
                .and_then(|index| question.options.get(index));
            let page = option_editor(&OptionForm {
                question: &question,
                option,
                return_url: &return_url,
                values: Some(&draft),
                error: Some(&message),
            });
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(error) => Err(error.into()),
    }
}
