//! Liveness endpoint for the shipment tracking service.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Reports that the shipment tracking service is up and serving requests.
///
/// Does not touch the event log or the projection store; a degraded
/// database surfaces on the shipment routes instead.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "shipment-tracking",
    })
}
