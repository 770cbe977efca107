//! Catalog and inventory handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::interfaces::http::common::{domain_error_response, ApiResponse};
use crate::interfaces::http::modules::reservations::ReservationAppState;

use super::dto::*;

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Inventory",
    responses(
        (status = 200, description = "Remaining slots per course", body = ApiResponse<StatusDto>),
        (status = 503, description = "Counter store or ledger unavailable")
    )
)]
pub async fn get_status(
    State(state): State<ReservationAppState>,
) -> Result<Json<ApiResponse<StatusDto>>, (StatusCode, Json<ApiResponse<StatusDto>>)> {
    let status = state
        .engine
        .get_status()
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(status.into())))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "Inventory",
    responses(
        (status = 200, description = "Course catalog", body = ApiResponse<Vec<CourseDto>>),
        (status = 503, description = "Counter store or ledger unavailable")
    )
)]
pub async fn list_courses(
    State(state): State<ReservationAppState>,
) -> Result<Json<ApiResponse<Vec<CourseDto>>>, (StatusCode, Json<ApiResponse<Vec<CourseDto>>>)> {
    let courses = state
        .engine
        .offering_statuses()
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        courses.into_iter().map(CourseDto::from).collect(),
    )))
}
