//! Shipment read and command endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{CustomerId, OrderId, ShipmentId};
use domain::{Actor, CustomerInfo, LineItem, Money, ProductCondition, Shipment, ShipmentStatus};
use projections::ShipmentView;
use repository::{
    CancelShipment, CompleteExchange, CompleteReturn, CreateShipment, InitiateExchange,
    InitiateReturn, ShipmentService, TransitionShipment,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: ShipmentService,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateShipmentRequest {
    pub order_id: String,
    pub customer: CustomerRequest,
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub name: String,
    pub email: String,
    pub address: String,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub article_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

/// Body for the plain status transitions and return completion.
#[derive(Deserialize, Default)]
pub struct ActionRequest {
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Deserialize)]
pub struct ExchangeRequest {
    pub reason: String,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub replacement_items: Option<Vec<LineItemRequest>>,
}

#[derive(Deserialize)]
pub struct CompleteExchangeRequest {
    pub condition: ProductCondition,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u32 {
    50
}

// -- Response types --

#[derive(Serialize)]
pub struct ShipmentResponse {
    pub shipment_id: String,
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
    pub kind: String,
    pub customer: CustomerResponse,
    pub items: Vec<LineItemResponse>,
    pub related_shipment_id: Option<String>,
    pub tracking: Vec<TrackingEntryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct CustomerResponse {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
}

#[derive(Serialize)]
pub struct LineItemResponse {
    pub article_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct TrackingEntryResponse {
    pub status: String,
    pub note: String,
    pub at: String,
    pub by: String,
}

#[derive(Serialize)]
pub struct ShipmentListResponse {
    pub shipments: Vec<ShipmentResponse>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct ExchangeResponse {
    pub original: ShipmentResponse,
    pub replacement: ShipmentResponse,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub event_id: String,
    pub event_type: String,
    pub shipment_id: String,
    pub order_id: String,
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    pub actor: String,
    pub note: String,
    pub occurred_at: String,
    pub payload: serde_json::Value,
}

impl From<&ShipmentView> for ShipmentResponse {
    fn from(view: &ShipmentView) -> Self {
        Self {
            shipment_id: view.shipment_id.to_string(),
            order_id: view.order_id.to_string(),
            customer_id: view.customer_id.to_string(),
            status: view.status.to_string(),
            kind: view.kind.to_string(),
            customer: CustomerResponse {
                customer_id: view.customer.customer_id.to_string(),
                name: view.customer.name.clone(),
                email: view.customer.email.clone(),
                address: view.customer.address.clone(),
            },
            items: view
                .items
                .iter()
                .map(|item| LineItemResponse {
                    article_id: item.article_id.to_string(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            related_shipment_id: view.related_shipment_id.map(|id| id.to_string()),
            tracking: view
                .tracking
                .iter()
                .map(|entry| TrackingEntryResponse {
                    status: entry.status.to_string(),
                    note: entry.note.clone(),
                    at: entry.at.to_rfc3339(),
                    by: entry.by.clone(),
                })
                .collect(),
            created_at: view.created_at.to_rfc3339(),
            updated_at: view.updated_at.to_rfc3339(),
        }
    }
}

impl From<&Shipment> for ShipmentResponse {
    fn from(shipment: &Shipment) -> Self {
        Self::from(&ShipmentView::from(shipment))
    }
}

// -- Handlers --

/// POST /shipments — register a shipment for a paid order.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<(axum::http::StatusCode, Json<ShipmentResponse>), ApiError> {
    let order_id: OrderId = parse_id(&req.order_id, "order_id")?;
    let customer_id = match &req.customer.customer_id {
        Some(raw) => parse_id(raw, "customer_id")?,
        None => CustomerId::new(),
    };

    let customer = CustomerInfo::new(
        customer_id,
        req.customer.name.as_str(),
        req.customer.email.as_str(),
        req.customer.address.as_str(),
    );
    let items = convert_items(&req.items);

    let mut cmd = CreateShipment::new(order_id, customer, items, actor_from(req.actor));
    if let Some(note) = req.note {
        cmd = cmd.with_note(note);
    }

    let shipment = state.service.create_shipment(cmd).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ShipmentResponse::from(&shipment)),
    ))
}

/// GET /shipments/{id} — read a shipment view by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let view = state
        .service
        .repository()
        .find_by_id(shipment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Shipment {id} not found")))?;

    Ok(Json(ShipmentResponse::from(&view)))
}

/// GET /shipments — list shipment views, paginated, optionally filtered
/// by status.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ShipmentListResponse>, ApiError> {
    let store = state.service.repository().projection_store();

    let (views, total) = match &params.status {
        Some(raw) => {
            let status = parse_status(raw)?;
            let views = store
                .by_status(status)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            let total = views.len() as u64;
            (views, total)
        }
        None => {
            let page = store
                .list(params.limit, params.offset)
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            (page.views, page.total)
        }
    };

    Ok(Json(ShipmentListResponse {
        shipments: views.iter().map(ShipmentResponse::from).collect(),
        total,
    }))
}

/// GET /shipments/stats — total and per-status view counts.
#[tracing::instrument(skip(state))]
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    use ShipmentStatus::*;

    let store = state.service.repository().projection_store();
    let total = store
        .count()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut by_status = BTreeMap::new();
    for status in [
        Pending,
        Prepared,
        InTransit,
        Delivered,
        Cancelled,
        Returning,
        Returned,
        ExchangeProcessed,
    ] {
        let count = store
            .count_by_status(status)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        by_status.insert(status.to_string(), count);
    }

    Ok(Json(StatsResponse { total, by_status }))
}

/// GET /orders/{id}/shipments — all shipment views for an order.
#[tracing::instrument(skip(state))]
pub async fn by_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ShipmentResponse>>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order id")?;

    let views = state
        .service
        .repository()
        .projection_store()
        .by_order(order_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(views.iter().map(ShipmentResponse::from).collect()))
}

/// GET /customers/{id}/shipments — all shipment views for a customer.
#[tracing::instrument(skip(state))]
pub async fn by_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ShipmentResponse>>, ApiError> {
    let customer_id: CustomerId = parse_id(&id, "customer id")?;

    let views = state
        .service
        .repository()
        .projection_store()
        .by_customer(customer_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(views.iter().map(ShipmentResponse::from).collect()))
}

/// GET /shipments/{id}/events — the full event history of a shipment.
#[tracing::instrument(skip(state))]
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let stored = state
        .service
        .repository()
        .event_log()
        .replay(shipment_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if stored.is_empty() {
        return Err(ApiError::NotFound(format!("Shipment {id} not found")));
    }

    let responses = stored
        .into_iter()
        .map(|event| EventResponse {
            event_id: event.event_id.to_string(),
            event_type: event.event_type,
            shipment_id: event.shipment_id.to_string(),
            order_id: event.order_id.to_string(),
            previous_status: event.previous_status,
            new_status: event.new_status,
            actor: event.actor,
            note: event.note,
            occurred_at: event.occurred_at.to_rfc3339(),
            payload: event.payload,
        })
        .collect();

    Ok(Json(responses))
}

/// POST /shipments/{id}/prepared — mark the shipment picked and packed.
#[tracing::instrument(skip(state, req))]
pub async fn mark_prepared(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment = state
        .service
        .mark_prepared(transition_command(&id, req)?)
        .await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/in-transit — record carrier handover.
#[tracing::instrument(skip(state, req))]
pub async fn mark_in_transit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment = state
        .service
        .mark_in_transit(transition_command(&id, req)?)
        .await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/delivered — confirm customer receipt.
#[tracing::instrument(skip(state, req))]
pub async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment = state
        .service
        .mark_delivered(transition_command(&id, req)?)
        .await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/cancel — cancel before carrier handover.
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let cmd = CancelShipment::new(shipment_id, req.reason, actor_from(req.actor));
    let shipment = state.service.cancel_shipment(cmd).await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/return — start a return of a delivered shipment.
#[tracing::instrument(skip(state, req))]
pub async fn initiate_return(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let cmd = InitiateReturn::new(shipment_id, req.reason, actor_from(req.actor));
    let shipment = state.service.initiate_return(cmd).await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/return/complete — settle a return after the goods
/// arrive back.
#[tracing::instrument(skip(state, req))]
pub async fn complete_return(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let mut cmd = CompleteReturn::new(shipment_id, actor_from(req.actor));
    if let Some(note) = req.note {
        cmd = cmd.with_note(note);
    }
    let shipment = state.service.complete_return(cmd).await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/{id}/exchange — exchange a delivered shipment for a
/// replacement.
#[tracing::instrument(skip(state, req))]
pub async fn initiate_exchange(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ExchangeRequest>,
) -> Result<(axum::http::StatusCode, Json<ExchangeResponse>), ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let mut cmd = InitiateExchange::new(shipment_id, req.reason, actor_from(req.actor));
    if let Some(items) = &req.replacement_items {
        cmd = cmd.with_replacement_items(convert_items(items));
    }

    let (original, replacement) = state.service.initiate_exchange(cmd).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ExchangeResponse {
            original: ShipmentResponse::from(&original),
            replacement: ShipmentResponse::from(&replacement),
        }),
    ))
}

/// POST /shipments/{id}/exchange/complete — close out an exchange after
/// inspecting the returned goods.
#[tracing::instrument(skip(state, req))]
pub async fn complete_exchange(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CompleteExchangeRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let mut cmd = CompleteExchange::new(shipment_id, req.condition, actor_from(req.actor));
    if let Some(note) = req.note {
        cmd = cmd.with_note(note);
    }
    let shipment = state.service.complete_exchange(cmd).await?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

// -- Helpers --

fn parse_id<T: std::str::FromStr<Err = uuid::Error>>(
    raw: &str,
    what: &str,
) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what}: {e}")))
}

fn parse_status(raw: &str) -> Result<ShipmentStatus, ApiError> {
    ShipmentStatus::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {raw}")))
}

fn actor_from(actor: Option<String>) -> Actor {
    actor.map(Actor::new).unwrap_or_else(Actor::system)
}

fn convert_items(items: &[LineItemRequest]) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| {
            LineItem::new(
                item.article_id.as_str(),
                item.quantity,
                Money::from_cents(item.unit_price_cents),
            )
        })
        .collect()
}

fn transition_command(id: &str, req: ActionRequest) -> Result<TransitionShipment, ApiError> {
    let shipment_id: ShipmentId = parse_id(id, "shipment id")?;

    let mut cmd = TransitionShipment::new(shipment_id, actor_from(req.actor));
    if let Some(note) = req.note {
        cmd = cmd.with_note(note);
    }
    Ok(cmd)
}
