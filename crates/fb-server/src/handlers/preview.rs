use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use fb_preview::views::{json_viewer as render_json_viewer, layout};
use fb_preview::{render_draft, render_form_preview, FormPage, PreviewDraft};
use fb_store::KvBackend;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FormPreviewQuery {
    page: Option<usize>,
}

/// Whole-form preview, one page at a time
pub(crate) async fn form(
    State(state): State<AppState>,
    Query(query): Query<FormPreviewQuery>,
) -> Html<String> {
    let pages: Vec<FormPage> = state
        .builder()
        .pages_with_questions()
        .into_iter()
        .map(|(page, questions)| FormPage { page, questions })
        .collect();
    let body = render_form_preview(&pages, query.page.unwrap_or_default());
    Html(layout("Form preview", &body))
}

/// Live preview fragment for an unsaved question
pub(crate) async fn field(Json(draft): Json<PreviewDraft>) -> Html<String> {
    Html(render_draft(&draft))
}

/// Serve the static lists file unchanged
pub(crate) async fn lists(State(state): State<AppState>) -> Response {
    let path = state.lists_file();
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "lists file not found");
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Lists file not found" })),
            )
                .into_response();
        }
        Err(error) => return load_failure(&error),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(_) => ([(CONTENT_TYPE, "application/json")], text).into_response(),
        Err(error) => load_failure(&error),
    }
}

fn load_failure(error: &dyn std::fmt::Display) -> Response {
    tracing::error!(%error, "failed to load lists file");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("Failed to load lists: {error}") })),
    )
        .into_response()
}

/// Every stored record, pretty-printed
pub(crate) async fn json_viewer(State(state): State<AppState>) -> Html<String> {
    let store = state.builder().repository().store();
    let records: Vec<(String, Value)> = store
        .backend()
        .keys()
        .into_iter()
        .filter_map(|key| store.get_raw_key::<Value>(&key).map(|value| (key, value)))
        .collect();
    Html(render_json_viewer(&records))
}
