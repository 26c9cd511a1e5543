//! API error type and its JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind};

/// Error body returned for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    pub kind: ErrorKind,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            response: ApiErrorResponse {
                message: message.into(),
                kind,
            },
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let kind = err.kind();

        if kind == ErrorKind::InternalServerError {
            tracing::error!(error = %err, "Request failed");
        }

        Self::new(kind, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.kind, self.response.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn test_validation_error_conversion() {
        let api_err: ApiError = DomainError::from(ValidationError::EmailInvalid).into();

        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.response.kind, ErrorKind::BadRequest);
        assert_eq!(api_err.response.message, "Email should be valid");
    }

    #[test]
    fn test_storage_error_conversion() {
        let api_err: ApiError = DomainError::storage("pool timed out").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.kind, ErrorKind::InternalServerError);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::bad_request("Date 1 should be before Date 2");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["message"], "Date 1 should be before Date 2");
        assert_eq!(json["kind"], "BAD_REQUEST");
    }

    #[test]
    fn test_display() {
        let err: ApiError = DomainError::storage("boom").into();
        assert_eq!(err.to_string(), "INTERNAL_SERVER_ERROR: Storage error: boom");
    }
}
