//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use fb_core::BuilderError;
use fb_preview::escape_html;
use fb_preview::views::{layout, not_found};

/// Handler error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Service error
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// Unusable path or form value
    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Status code for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Builder(e) if e.is_missing_reference() => StatusCode::NOT_FOUND,
            Self::Builder(e) if e.is_user_facing() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Builder(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match status {
            StatusCode::NOT_FOUND => not_found(&self.to_string()),
            StatusCode::UNPROCESSABLE_ENTITY => layout(
                "There is a problem",
                &format!(
                    "<h1 class=\"govuk-heading-l\">There is a problem</h1>\n<p class=\"govuk-body\">{}</p>\n",
                    escape_html(&self.to_string())
                ),
            ),
            _ => {
                tracing::error!(error = %self, "request failed");
                layout(
                    "Sorry, there is a problem with the service",
                    "<h1 class=\"govuk-heading-l\">Sorry, there is a problem with the service</h1>\n\
                     <p class=\"govuk-body\">Try again later.</p>\n",
                )
            }
        };
        (status, Html(body)).into_response()
    }
}

/// Result alias for handlers
pub type AppResult<T> = Result<T, AppError>;
