use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::StoreError;
use crate::llm::ProviderError;

/// Everything that can go wrong while handling a review request. Each variant
/// maps to one HTTP status; provider and storage details are logged
/// server-side and replaced with generic messages in responses.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("user record not found")]
    UserNotFound,

    #[error("not allowed to access this submission")]
    Forbidden,

    #[error("submission not found")]
    NotFound,

    #[error("no exercise is associated with this submission")]
    NoExercise,

    #[error("submission content is empty")]
    EmptySubmission,

    #[error("code is too long (limit: {0} characters)")]
    CodeTooLong(usize),

    #[error("{0}")]
    BadRequest(String),

    #[error("AI review is not configured")]
    ServiceUnavailable,

    #[error("no active user exists for the auth bypass")]
    NoSeedUser,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ReviewError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ReviewError::UserNotFound | ReviewError::Forbidden => StatusCode::FORBIDDEN,
            ReviewError::NotFound => StatusCode::NOT_FOUND,
            ReviewError::NoExercise
            | ReviewError::EmptySubmission
            | ReviewError::CodeTooLong(_)
            | ReviewError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ReviewError::ServiceUnavailable | ReviewError::NoSeedUser => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ReviewError::Provider(_) => StatusCode::BAD_GATEWAY,
            ReviewError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Provider and storage failures get a
    /// generic message; the underlying cause stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ReviewError::Provider(_) => {
                "Failed to generate the AI review. Please try again.".to_string()
            }
            ReviewError::Storage(_) => "An internal error occurred.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            ReviewError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ReviewError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ReviewError::UserNotFound.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ReviewError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ReviewError::NoExercise.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ReviewError::CodeTooLong(50_000).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReviewError::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ReviewError::Provider(ProviderError("quota exceeded".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ReviewError::Storage(StoreError("connection reset".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn provider_detail_is_not_exposed_to_clients() {
        let err = ReviewError::Provider(ProviderError("deadline exceeded: upstream 504".into()));
        let message = err.public_message();
        assert!(!message.contains("deadline"));
        assert!(message.contains("try again"));
    }

    #[test]
    fn storage_detail_is_not_exposed_to_clients() {
        let err = ReviewError::Storage(StoreError("relation ai_reviews does not exist".into()));
        assert!(!err.public_message().contains("ai_reviews"));
    }
}
