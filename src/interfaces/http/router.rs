//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::ReservationEngine;

use super::common::{ApiResponse, EmptyData};
use super::modules::admin::{self, ResetResponse};
use super::modules::health::{self, ComponentHealth, HealthResponse, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::offerings::{self, CourseDto, StatusDto};
use super::modules::reservations::{
    self, BuyRequest, BuyResponse, OrderDto, ReservationAppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        reservations::buy,
        reservations::list_orders,
        offerings::get_status,
        offerings::list_courses,
        admin::reset,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            HealthResponse,
            ComponentHealth,
            BuyRequest,
            BuyResponse,
            OrderDto,
            StatusDto,
            CourseDto,
            ResetResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Reservations", description = "Buying course slots and reading the order ledger"),
        (name = "Inventory", description = "Course catalog and remaining slots"),
        (name = "Admin", description = "Administrative reset"),
    ),
    info(
        title = "Seat Rush API",
        version = "1.0.0",
        description = "Flash-sale slot reservation for limited-capacity courses",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the HTTP router with all routes
pub fn create_api_router(
    engine: Arc<ReservationEngine>,
    db: DatabaseConnection,
    metrics_handle: PrometheusHandle,
) -> Router {
    let api_routes = Router::new()
        .route("/buy", post(reservations::buy))
        .route("/orders", get(reservations::list_orders))
        .route("/status", get(offerings::get_status))
        .route("/courses", get(offerings::list_courses))
        .route("/reset", post(admin::reset))
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .with_state(ReservationAppState { engine });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: metrics_handle,
        });

    // the browser client calls cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
