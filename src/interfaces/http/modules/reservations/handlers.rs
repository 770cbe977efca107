//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::{RejectReason, ReservationEngine, ReserveOutcome};
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct ReservationAppState {
    pub engine: Arc<ReservationEngine>,
}

type HandlerError<T> = (StatusCode, Json<ApiResponse<T>>);

/// Seconds a client should wait before resending a retryable rejection.
const RETRY_AFTER_SECS: &str = "1";

fn reject_status(reason: RejectReason) -> StatusCode {
    match reason {
        RejectReason::SoldOut => StatusCode::BAD_REQUEST,
        RejectReason::NotFound => StatusCode::NOT_FOUND,
        RejectReason::Duplicate => StatusCode::CONFLICT,
        RejectReason::NotReady | RejectReason::PersistenceFailure => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/buy",
    tag = "Reservations",
    request_body = BuyRequest,
    responses(
        (status = 200, description = "Slot granted", body = ApiResponse<BuyResponse>),
        (status = 400, description = "SOLD_OUT"),
        (status = 404, description = "NOT_FOUND: unknown course"),
        (status = 409, description = "DUPLICATE: user already holds a slot"),
        (status = 422, description = "Invalid request body"),
        (status = 503, description = "NOT_READY or PERSISTENCE_FAILURE, retry after the Retry-After delay")
    )
)]
pub async fn buy(
    State(state): State<ReservationAppState>,
    ValidatedJson(request): ValidatedJson<BuyRequest>,
) -> Response {
    match state.engine.reserve(&request.course_id, &request.user_id).await {
        ReserveOutcome::Granted {
            reservation_id,
            remaining,
        } => Json(ApiResponse::success(BuyResponse {
            ticket_id: reservation_id,
            remaining,
        }))
        .into_response(),
        ReserveOutcome::Rejected { reason } => {
            let body = Json(ApiResponse::<BuyResponse>::error(reason.as_str()));
            if reason.is_retryable() {
                (
                    reject_status(reason),
                    [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
                    body,
                )
                    .into_response()
            } else {
                (reject_status(reason), body).into_response()
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Reservations",
    params(OrdersQuery),
    responses(
        (status = 200, description = "Most recent orders first", body = ApiResponse<Vec<OrderDto>>),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn list_orders(
    State(state): State<ReservationAppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, HandlerError<Vec<OrderDto>>> {
    let limit = query.limit.clamp(1, MAX_ORDERS_LIMIT);
    let orders = state
        .engine
        .list_recent(limit)
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}
