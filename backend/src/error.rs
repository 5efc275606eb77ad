//! Error type shared by every manager and HTTP handler.
//!
//! Known failures carry a short `summary` and a user-facing `message`. They are rendered as
//! `{"errors":[{"errorType", "summary", "message", "httpStatus"}]}` with the matching status code.
//! Infrastructure failures (database, JSON, CSV, IO) map to `500` and only their category is
//! exposed; the underlying error is logged.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::validation::ValidationError;
use log::error;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{summary}: {message}")]
    ResourceNotFound { summary: String, message: String },
    #[error("{summary}: {message}")]
    Conflict { summary: String, message: String },
    #[error("{summary}: {message}")]
    InvalidInput { summary: String, message: String },
    #[error("{summary}: {message}")]
    InsufficientRights { summary: String, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("message rejected: {0}")]
    MessageQueueReject(String),
    #[error("message queue unavailable: {0}")]
    QueueUnavailable(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn not_found(summary: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ResourceNotFound {
            summary: summary.into(),
            message: message.into(),
        }
    }

    pub fn conflict(summary: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            summary: summary.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(summary: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            summary: summary.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_rights(summary: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InsufficientRights {
            summary: summary.into(),
            message: message.into(),
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::ResourceNotFound { .. } => "resource-not-found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::InvalidInput { .. } => "invalid-input",
            ApiError::InsufficientRights { .. } => "insufficient-rights",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::MessageQueueReject(_) => "message-queue-rejected",
            ApiError::QueueUnavailable(_) => "service-unavailable",
            ApiError::Database(_) | ApiError::Json(_) | ApiError::Csv(_) | ApiError::Io(_) => {
                "internal-server-error"
            }
        }
    }

    fn details(&self) -> ErrorDetails {
        let (summary, message) = match self {
            ApiError::ResourceNotFound { summary, message }
            | ApiError::Conflict { summary, message }
            | ApiError::InvalidInput { summary, message }
            | ApiError::InsufficientRights { summary, message } => {
                (summary.clone(), message.clone())
            }
            ApiError::Unauthorized(message) => ("Unauthorized".to_string(), message.clone()),
            ApiError::MessageQueueReject(message) => {
                ("Message rejected".to_string(), message.clone())
            }
            ApiError::QueueUnavailable(_) => (
                "Service unavailable".to_string(),
                "The message queue is not available. Please try again later.".to_string(),
            ),
            ApiError::Database(_) | ApiError::Json(_) | ApiError::Csv(_) | ApiError::Io(_) => (
                "An internal server error occurred".to_string(),
                "The request could not be processed.".to_string(),
            ),
        };
        ErrorDetails {
            error_type: self.error_type(),
            summary,
            message,
            http_status: self.status_code().as_u16(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::invalid_input("Validation failed", error.to_string())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub error_type: &'static str,
    pub summary: String,
    pub message: String,
    pub http_status: u16,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetails>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InvalidInput { .. } | ApiError::MessageQueueReject(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InsufficientRights { .. } => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::QueueUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Json(_) | ApiError::Csv(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("Request failed: {}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            errors: vec![self.details()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn known_errors_render_structured_body() {
        let error = ApiError::not_found("Data point not found", "No data point with id x exists.");
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0]["errorType"], "resource-not-found");
        assert_eq!(json["errors"][0]["summary"], "Data point not found");
        assert_eq!(json["errors"][0]["httpStatus"], 404);
    }

    #[actix_web::test]
    async fn internal_errors_do_not_leak_details() {
        let error = ApiError::Database(rusqlite::Error::InvalidQuery);
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("InvalidQuery"));
    }
}
