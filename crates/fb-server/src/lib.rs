//! HTTP editor for the form builder
//!
//! Routes:
//! - Pages: list, create, edit, delete
//! - Questions: field type chooser, editor, save, autosave, reorder, delete
//! - Options: editor, save, reorder, delete, list import
//! - Previews: form preview, live field preview, the lists file, stored records
//!
//! Every response is marked uncacheable and every request is traced.

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
mod handlers;
pub mod middleware;

use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use fb_core::{Autosave, BuilderError, FormBuilder, SystemClock};
use fb_store::KvBackend;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, AppResult};

/// Storage shared by every request
pub type SharedBackend = Arc<dyn KvBackend>;

/// Builder service used by the server
pub type Builder = FormBuilder<SharedBackend, SystemClock>;

/// Handler state
#[derive(Clone)]
pub struct AppState {
    builder: Arc<Builder>,
    autosave: Autosave<SharedBackend, SystemClock>,
    lists_file: Arc<PathBuf>,
}

impl AppState {
    /// State over `backend`
    ///
    /// Must be called inside a Tokio runtime when autosave is used.
    ///
    /// # Errors
    /// Backend failure while seeding default lists.
    pub fn new(backend: SharedBackend, config: &ServerConfig) -> Result<Self, BuilderError> {
        let builder = Arc::new(FormBuilder::open(backend, config.builder.clone())?);
        Ok(Self {
            autosave: Autosave::new(Arc::clone(&builder)),
            builder,
            lists_file: Arc::new(config.lists_file.clone()),
        })
    }

    /// Builder service
    #[must_use]
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Debounced text edits
    #[must_use]
    pub fn autosave(&self) -> &Autosave<SharedBackend, SystemClock> {
        &self.autosave
    }

    /// Static lists file
    #[must_use]
    pub fn lists_file(&self) -> &Path {
        &self.lists_file
    }
}

async fn fallback() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(fb_preview::views::not_found(
            "If you typed the web address, check it is correct.",
        )),
    )
}

/// Application router
pub fn router(state: AppState) -> Router {
    use handlers::{options, pages, preview, questions};

    Router::new()
        .route("/", get(pages::index))
        .route("/pages", get(pages::list))
        .route("/pages/{page_id}/delete", post(pages::delete))
        .route("/page-create", get(pages::create_form))
        .route("/page-create/save", post(pages::create))
        .route("/page-editor/{page_id}", get(pages::editor))
        .route(
            "/page-editor/{page_id}/questions/{question_id}/move/{direction}",
            post(pages::move_question),
        )
        .route(
            "/page-editor/{page_id}/questions/{question_id}/delete",
            post(pages::delete_question),
        )
        .route("/field-types", get(questions::field_types))
        .route("/question-editor/new/{field_type}", get(questions::create))
        .route("/question-editor/{key}/{id}", get(questions::editor))
        .route("/question-editor/{key}/save", post(questions::save))
        .route("/question-editor/{key}/autosave", post(questions::autosave))
        .route("/question-editor/{key}/import", post(questions::import))
        .route(
            "/question-editor/{key}/options/{id}/move/{direction}",
            post(questions::move_option),
        )
        .route(
            "/question-editor/{key}/options/{id}/delete",
            post(questions::delete_option),
        )
        .route("/option-editor/{key}", get(options::create_form))
        .route("/option-editor/{key}/{id}", get(options::edit_form))
        .route("/option-editor/{key}/save", post(options::save))
        .route("/form-preview", get(preview::form))
        .route("/preview", post(preview::field))
        .route("/api/lists", get(preview::lists))
        .route("/json-viewer", get(preview::json_viewer))
        .fallback(fallback)
        .layer(axum::middleware::from_fn(middleware::trace_and_no_store))
        .with_state(state)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
