//! Shared HTTP building blocks: response envelope and validated extractor

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "SOLD_OUT"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Error code or description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Map a core error to its HTTP status and envelope.
pub fn domain_error_response<T>(e: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match &e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::PersistenceFailure(_)
        | DomainError::Unavailable(_)
        | DomainError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ApiResponse::error(e.to_string())))
}
