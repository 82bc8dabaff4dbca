//! Error types for the Warung API.
//!
//! Every handler returns [`ApiResult`]. Ledger rule violations keep their
//! message; storage failures are logged here and reach the client only as a
//! generic 500.
//!
//! ```text
//! CoreError::InsufficientStock ──► 400 {"error": "Insufficient stock ...", "code": "INSUFFICIENT_STOCK"}
//! CoreError::NotFound          ──► 404 {"error": "product not found: Kopi", "code": "NOT_FOUND"}
//! DbError::QueryFailed         ──► 500 {"error": "Internal server error", "code": "INTERNAL_ERROR"}
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use warung_core::{CoreError, ValidationError};
use warung_db::DbError;

/// An error as the HTTP client sees it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CoreError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"),
            CoreError::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS"),
            CoreError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            CoreError::InvalidArgument { .. } => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rule(rule) => rule.into(),
            DbError::UniqueViolation { constraint } => {
                Self::bad_request("DUPLICATE", format!("Duplicate value violates {constraint}"))
            }
            DbError::ForeignKeyViolation { .. } => {
                Self::bad_request("CONFLICT", "Record is still referenced by other records")
            }
            other => {
                tracing::error!(error = %other, "Storage error");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_BODY", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("INVALID_PATH", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("INVALID_QUERY", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warung_core::Money;

    #[test]
    fn test_rule_status_mapping() {
        let cases = [
            (CoreError::not_found("product", "Kopi"), StatusCode::NOT_FOUND),
            (
                CoreError::InsufficientStock {
                    product: "Kopi".to_string(),
                    available: 2,
                    requested: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::InsufficientFunds {
                    account: "Kas".to_string(),
                    balance: Money::zero(),
                    requested: Money::from_major(5),
                },
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::Conflict("in use".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_db_rule_keeps_message() {
        let err = ApiError::from(DbError::Rule(CoreError::Conflict("in use".to_string())));
        assert_eq!(err.code, "CONFLICT");
        assert_eq!(err.message, "in use");
    }

    #[test]
    fn test_storage_errors_are_hidden() {
        let err = ApiError::from(DbError::QueryFailed("relation \"x\" does not exist".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");

        let err = ApiError::from(DbError::PoolExhausted);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_code() {
        let err = ApiError::from(ValidationError::Required {
            field: "name".to_string(),
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_out_of_range_amount_is_a_client_error() {
        let err = ApiError::from(DbError::Rule(CoreError::Validation(
            ValidationError::OutOfRange {
                field: "amount".to_string(),
                reason: "numeric field overflow".to_string(),
            },
        )));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION_ERROR");
    }
}
