//! Operational endpoints for projection maintenance.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ShipmentId;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::shipments::{AppState, ShipmentResponse};

#[derive(Serialize)]
pub struct ConsistencyResponse {
    pub shipment_id: String,
    pub log_status: String,
    pub projection_status: Option<String>,
    pub consistent: bool,
}

#[derive(Serialize)]
pub struct RebuildAllResponse {
    pub rebuilt: usize,
}

/// GET /admin/shipments/{id}/consistency — compare the event log against
/// the projection for one shipment.
#[tracing::instrument(skip(state))]
pub async fn check_consistency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConsistencyResponse>, ApiError> {
    let shipment_id: ShipmentId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid shipment id: {e}")))?;

    let report = state
        .service
        .repository()
        .validate_consistency(shipment_id)
        .await?;

    Ok(Json(ConsistencyResponse {
        shipment_id: report.shipment_id.to_string(),
        log_status: report.log_status.to_string(),
        projection_status: report.projection_status.map(|s| s.to_string()),
        consistent: report.consistent,
    }))
}

/// POST /admin/shipments/{id}/rebuild — rebuild one projection from the
/// event log.
#[tracing::instrument(skip(state))]
pub async fn rebuild_projection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid shipment id: {e}")))?;

    let view = state
        .service
        .repository()
        .rebuild_projection(shipment_id)
        .await?;

    Ok(Json(ShipmentResponse::from(&view)))
}

/// POST /admin/rebuild — drop and rebuild the whole read model from the
/// event log.
#[tracing::instrument(skip(state))]
pub async fn rebuild_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RebuildAllResponse>, ApiError> {
    let rebuilt = state.service.repository().rebuild_all_projections().await?;
    Ok(Json(RebuildAllResponse { rebuilt }))
}
