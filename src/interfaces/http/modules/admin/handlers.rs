use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::interfaces::http::common::{domain_error_response, ApiResponse};
use crate::interfaces::http::modules::reservations::ReservationAppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
}

/// Clears every order and restores all courses to full capacity.
#[utoipa::path(
    post,
    path = "/api/reset",
    tag = "Admin",
    responses(
        (status = 200, description = "Ledger cleared, counters at capacity", body = ApiResponse<ResetResponse>),
        (status = 503, description = "Reset failed; courses stay NOT_READY until a reset succeeds")
    )
)]
pub async fn reset(
    State(state): State<ReservationAppState>,
) -> Result<Json<ApiResponse<ResetResponse>>, (StatusCode, Json<ApiResponse<ResetResponse>>)> {
    warn!("Administrative reset requested");
    state
        .engine
        .admin_reset()
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(ResetResponse {
        message: "System reset from catalog".to_string(),
    })))
}
