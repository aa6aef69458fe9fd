use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("dataset not found: {0}")]
    NotFound(String),

    #[error("AI service is not configured")]
    AiUnavailable,

    #[error("upstream model call failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl GalleryError {
    pub fn status(&self) -> StatusCode {
        match self {
            GalleryError::InvalidInput(_) | GalleryError::Json(_) => StatusCode::BAD_REQUEST,
            GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GalleryError::Upstream(_) | GalleryError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the client. Server-side failures never echo
    /// their details; those only go to the log.
    fn public_message(&self) -> String {
        match self {
            GalleryError::Upstream(_) => "Failed to get an answer from the AI model".to_string(),
            GalleryError::Storage(_) => "Failed to save annotation".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorResponse { error: self.public_message() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GalleryError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GalleryError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(GalleryError::AiUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            GalleryError::Upstream("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_details_are_not_exposed() {
        let err = GalleryError::Upstream("API key invalid: sk-123".into());
        assert!(!err.public_message().contains("sk-123"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = GalleryError::InvalidInput("Missing question".into());
        assert_eq!(err.public_message(), "Missing question");
    }
}
