use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Handler failures, rendered as the API's `{"error", "message"}` envelope.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("X-Organization-ID header is required")]
    OrganizationRequired,

    #[error("{0}")]
    BadRequest(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

impl MockError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        MockError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            MockError::Unauthorized => StatusCode::UNAUTHORIZED,
            MockError::OrganizationRequired | MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MockError::Unauthorized => "unauthorized",
            MockError::OrganizationRequired => "organization_required",
            MockError::BadRequest(_) => "bad_request",
            MockError::NotFound { .. } => "not_found",
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = MockError::not_found("source", 7);
        assert_eq!(err.to_string(), "source 7 not found");
    }

    #[test]
    fn statuses_and_codes_match_the_api() {
        assert_eq!(MockError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(MockError::OrganizationRequired.code(), "organization_required");
        assert_eq!(MockError::BadRequest("x".to_string()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(MockError::not_found("event", "evt_1").status(), StatusCode::NOT_FOUND);
    }
}
