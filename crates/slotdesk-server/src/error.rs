use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use slotdesk_core::SlotError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

/// HTTP status for a domain error.
pub fn status_for(err: &SlotError) -> StatusCode {
    match err {
        SlotError::NotAuthenticated | SlotError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        SlotError::NotInitialized | SlotError::EmptyText | SlotError::InvalidSlot(_) => {
            StatusCode::BAD_REQUEST
        }
        SlotError::UnknownPage(_) | SlotError::UserNotFound(_) => StatusCode::NOT_FOUND,
        SlotError::UserExists(_) => StatusCode::CONFLICT,
        SlotError::Store(_)
        | SlotError::Session(_)
        | SlotError::Clipboard(_)
        | SlotError::Io(_)
        | SlotError::Yaml(_)
        | SlotError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<SlotError>() {
            Some(e) => status_for(e),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
