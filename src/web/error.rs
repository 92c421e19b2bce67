use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::extract::found;
use super::LOGIN_URL;
use crate::error::NotekeeperError;

impl IntoResponse for NotekeeperError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Same body for a missing note and someone else's note.
            NotekeeperError::NotFound | NotekeeperError::UserNotFound(_) => StatusCode::NOT_FOUND,
            NotekeeperError::Unauthenticated => return found(LOGIN_URL),
            NotekeeperError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            NotekeeperError::DuplicateSlug { .. }
            | NotekeeperError::UsernameTaken
            | NotekeeperError::InvalidCredentials => StatusCode::BAD_REQUEST,
            _ => {
                tracing::error!(error = %self, "request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response();
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
