//! HTTP API server with observability for the shipment tracking system.
//!
//! Provides REST endpoints for shipment commands, projection reads and
//! projection maintenance, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_log::{EventLog, InMemoryEventLog};
use messaging::{InMemoryMessageBus, MessageBus, ShipmentNotifier};
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{InMemoryProjectionStore, ProjectionStore};
use repository::{ShipmentRepository, ShipmentService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::shipments::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/shipments", post(routes::shipments::create))
        .route("/shipments", get(routes::shipments::list))
        .route("/shipments/stats", get(routes::shipments::stats))
        .route("/shipments/{id}", get(routes::shipments::get))
        .route("/shipments/{id}/events", get(routes::shipments::events))
        .route(
            "/shipments/{id}/prepared",
            post(routes::shipments::mark_prepared),
        )
        .route(
            "/shipments/{id}/in-transit",
            post(routes::shipments::mark_in_transit),
        )
        .route(
            "/shipments/{id}/delivered",
            post(routes::shipments::mark_delivered),
        )
        .route("/shipments/{id}/cancel", post(routes::shipments::cancel))
        .route(
            "/shipments/{id}/return",
            post(routes::shipments::initiate_return),
        )
        .route(
            "/shipments/{id}/return/complete",
            post(routes::shipments::complete_return),
        )
        .route(
            "/shipments/{id}/exchange",
            post(routes::shipments::initiate_exchange),
        )
        .route(
            "/shipments/{id}/exchange/complete",
            post(routes::shipments::complete_exchange),
        )
        .route("/orders/{id}/shipments", get(routes::shipments::by_order))
        .route(
            "/customers/{id}/shipments",
            get(routes::shipments::by_customer),
        )
        .route(
            "/admin/shipments/{id}/consistency",
            get(routes::admin::check_consistency),
        )
        .route(
            "/admin/shipments/{id}/rebuild",
            post(routes::admin::rebuild_projection),
        )
        .route("/admin/rebuild", post(routes::admin::rebuild_all))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given stores and bus.
pub fn create_state(
    log: Arc<dyn EventLog>,
    views: Arc<dyn ProjectionStore>,
    bus: Arc<dyn MessageBus>,
) -> Arc<AppState> {
    let repository = ShipmentRepository::new(log, views);
    let service = ShipmentService::new(repository, ShipmentNotifier::new(bus));
    Arc::new(AppState { service })
}

/// Creates application state backed entirely by in-memory stores.
pub fn create_default_state() -> Arc<AppState> {
    create_state(
        Arc::new(InMemoryEventLog::new()),
        Arc::new(InMemoryProjectionStore::new()),
        Arc::new(InMemoryMessageBus::new()),
    )
}
