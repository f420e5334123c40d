//! Error types for myp-api
//!
//! Every request-level failure ends up here and is turned into a JSON body:
//!
//! ```json
//! {"error": {"code": "...", "message": "...", "violations": [...]}}
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use myp_common::Violation;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields missing or outside their domain (422)
    #[error("Validation failed: {}", first_message(.0))]
    Validation(Vec<Violation>),

    /// Body could not be decoded into a feature object (422)
    #[error("Invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),

    /// Model artifact not loaded; the service is degraded (503)
    #[error("Model not loaded. Please ensure the model file exists.")]
    ModelUnavailable,

    /// Model invocation failed (500); message is safe to show clients
    #[error("{0}")]
    Prediction(String),
}

fn first_message(violations: &[Violation]) -> &str {
    violations
        .first()
        .map(|v| v.message.as_str())
        .unwrap_or("invalid input")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_code, violations) = match self {
            ApiError::Validation(violations) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", Some(violations))
            }
            ApiError::Body(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", None),
            ApiError::ModelUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE", None)
            }
            ApiError::Prediction(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PREDICTION_FAILED", None)
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(violations) = violations {
            error["violations"] = json!(violations);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let violation = Violation {
            field: "tempo".to_string(),
            value: Some(-5.0),
            constraint: "greater than 0".to_string(),
            message: "'tempo' must be greater than 0, got -5".to_string(),
        };
        assert_eq!(
            ApiError::Validation(vec![violation]).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ModelUnavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Prediction("Prediction failed".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_names_first_field() {
        let violations = vec![
            Violation {
                field: "key".to_string(),
                value: Some(15.0),
                constraint: "between 0 and 11".to_string(),
                message: "'key' must be between 0 and 11, got 15".to_string(),
            },
            Violation {
                field: "mode".to_string(),
                value: None,
                constraint: "between 0 and 1".to_string(),
                message: "field 'mode' is required".to_string(),
            },
        ];
        let err = ApiError::Validation(violations);
        assert_eq!(err.to_string(), "Validation failed: 'key' must be between 0 and 11, got 15");
    }
}
