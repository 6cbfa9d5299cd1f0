use super::{
    non_empty, parse_direction, parse_option, parse_page, parse_question, return_or, run_gated,
    to_pages, ConfirmForm, Gated, Prompt,
};
use crate::error::{AppError, AppResult};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use fb_core::{BuilderError, Command, ImportMode};
use fb_model::{FieldSettings, FieldType, QuestionId, QuestionOption, QuestionPatch, QuestionRecord};
use fb_preview::views;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditorQuery {
    page_id: Option<String>,
    return_url: Option<String>,
}

pub(crate) async fn field_types(
    State(state): State<AppState>,
    Query(query): Query<EditorQuery>,
) -> AppResult<Response> {
    let Some(raw) = non_empty(query.page_id) else {
        return Ok(to_pages());
    };
    let page = state.builder().page(&parse_page(&raw)?)?;
    Ok(Html(views::field_type_chooser(&page.id)).into_response())
}

/// Create a draft question and open its editor
pub(crate) async fn create(
    State(state): State<AppState>,
    Path(field_type): Path<String>,
    Query(query): Query<EditorQuery>,
) -> AppResult<Response> {
    let Some(raw) = non_empty(query.page_id) else {
        return Ok(to_pages());
    };
    let page_id = parse_page(&raw)?;
    let field_type: FieldType = field_type
        .parse()
        .map_err(|e: fb_model::FieldTypeError| AppError::not_found(e.to_string()))?;
    let question = state.builder().create_question(&page_id, field_type)?;
    Ok(Redirect::to(&views::question_editor_url(&question)).into_response())
}

pub(crate) async fn editor(
    State(state): State<AppState>,
    Path((_field_type, question_id)): Path<(String, String)>,
    Query(query): Query<EditorQuery>,
) -> AppResult<Response> {
    let question_id = parse_question(&question_id)?;
    match state.builder().question(&question_id) {
        Ok(question) => {
            let return_url = return_or(query.return_url, views::page_editor_url(&question.page_id));
            let lists = state.builder().lists();
            Ok(Html(views::question_editor(&question, &lists, &return_url)).into_response())
        }
        Err(error) if error.is_missing_reference() && non_empty(query.page_id).is_none() => {
            Ok(to_pages())
        }
        Err(error) => Err(error.into()),
    }
}

/// Body of the question editor form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveQuestionForm {
    page_id: Option<String>,
    field_type: Option<String>,
    return_url: Option<String>,
    title: Option<String>,
    hint: Option<String>,
    options: Option<String>,
    max_length: Option<String>,
    pattern: Option<String>,
    min: Option<String>,
    max: Option<String>,
    accept: Option<String>,
    max_size: Option<String>,
}

impl SaveQuestionForm {
    /// Full record for `id`; an unreadable `options` field counts as absent
    fn to_record(&self, id: &QuestionId) -> QuestionRecord {
        let trimmed = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string());
        let options = self.options.as_deref().and_then(|raw| {
            serde_json::from_str::<Vec<QuestionOption>>(raw)
                .inspect_err(|error| tracing::warn!(question = %id, %error, "unreadable options field"))
                .ok()
        });
        QuestionRecord {
            id: Some(id.to_string()),
            page_id: non_empty(self.page_id.clone()),
            field_type: non_empty(self.field_type.clone()),
            title: trimmed(&self.title),
            hint: trimmed(&self.hint),
            options,
            position: None,
            settings: FieldSettings {
                max_length: trimmed(&self.max_length),
                pattern: trimmed(&self.pattern),
                min: trimmed(&self.min),
                max: trimmed(&self.max),
                accept: trimmed(&self.accept),
                max_size: trimmed(&self.max_size),
            },
        }
    }
}

pub(crate) async fn save(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Form(form): Form<SaveQuestionForm>,
) -> AppResult<Redirect> {
    let question_id = parse_question(&question_id)?;
    state.autosave().cancel(&question_id);
    let saved = state.builder().save_question(&form.to_record(&question_id))?;
    let return_url = return_or(form.return_url, views::page_editor_url(&saved.page_id));
    Ok(Redirect::to(&return_url))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AutosaveForm {
    title: Option<String>,
    hint: Option<String>,
}

/// Queue a text edit; written after the debounce delay
pub(crate) async fn autosave(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Form(form): Form<AutosaveForm>,
) -> AppResult<StatusCode> {
    let question_id = parse_question(&question_id)?;
    state.builder().question(&question_id)?;
    let mut patch = QuestionPatch::new();
    if let Some(title) = form.title {
        patch = patch.with_title(title);
    }
    if let Some(hint) = form.hint {
        patch = patch.with_hint(hint);
    }
    if !patch.is_empty() {
        state.autosave().schedule(question_id, patch);
    }
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImportForm {
    list_id: Option<String>,
    mode: Option<String>,
    confirm: Option<String>,
    return_url: Option<String>,
}

pub(crate) async fn import(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Form(form): Form<ImportForm>,
) -> AppResult<Response> {
    let question_id = parse_question(&question_id)?;
    let question = state.builder().question(&question_id)?;
    let Some(list_id) = non_empty(form.list_id) else {
        return Err(BuilderError::validation("Choose a list to import").into());
    };
    let mode: ImportMode = form
        .mode
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(BuilderError::validation)?;

    let return_url = return_or(form.return_url, views::question_editor_url(&question));
    let action = format!("/question-editor/{question_id}/import");
    let prompt = Prompt {
        action: &action,
        fields: &[
            ("listId", list_id.as_str()),
            ("mode", mode.as_str()),
            ("returnUrl", return_url.as_str()),
        ],
        cancel_url: &return_url,
    };
    let command = Command::ImportList {
        question: question_id,
        list_id: list_id.clone(),
        mode,
    };
    match run_gated(state.builder(), command, form.confirm.as_deref(), &prompt)? {
        Gated::Committed(_) => Ok(Redirect::to(&return_url).into_response()),
        Gated::Ask(page) => Ok(page),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReturnForm {
    return_url: Option<String>,
}

pub(crate) async fn move_option(
    State(state): State<AppState>,
    Path((question_id, option_id, direction)): Path<(String, String, String)>,
    Form(form): Form<ReturnForm>,
) -> AppResult<Redirect> {
    let question_id = parse_question(&question_id)?;
    let option_id = parse_option(&option_id)?;
    let direction = parse_direction(&direction)?;
    state
        .builder()
        .reorder_option(&question_id, &option_id, direction)?;
    let question = state.builder().question(&question_id)?;
    Ok(Redirect::to(&return_or(
        form.return_url,
        views::question_editor_url(&question),
    )))
}

pub(crate) async fn delete_option(
    State(state): State<AppState>,
    Path((question_id, option_id)): Path<(String, String)>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Response> {
    let question_id = parse_question(&question_id)?;
    let option_id = parse_option(&option_id)?;
    let question = state.builder().question(&question_id)?;
    let return_url = return_or(form.return_url, views::question_editor_url(&question));
    let action = format!("/question-editor/{question_id}/options/{option_id}/delete");
    let prompt = Prompt {
        action: &action,
        fields: &[("returnUrl", return_url.as_str())],
        cancel_url: &return_url,
    };
    let command = Command::DeleteOption {
        question: question_id,
        option: option_id,
    };
    match run_gated(state.builder(), command, form.confirm.as_deref(), &prompt)? {
        Gated::Committed(_) => Ok(Redirect::to(&return_url).into_response()),
        Gated::Ask(page) => Ok(page),
    }
}
