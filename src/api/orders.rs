//! Order lifecycle endpoints.
//!
//! Each `POST /orders/:id/<action>` maps to one transition. Illegal transitions come back
//! as 409 with the order unchanged.

use super::AppState;
use super::error::{ApiJson, ApiResult};
use crate::core::session::Session;
use crate::core::{order, profile, review};
use crate::entities::{OrderModel, ReviewModel};
use crate::errors::Error;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

/// Order route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/confirm", post(confirm_order))
        .route("/orders/:id/ship", post(ship_order))
        .route("/orders/:id/deliver", post(deliver_order))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/review", post(review_order))
}

/// Query string of `GET /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// List the orders of this farm instead of the caller's purchases
    pub farm_id: Option<i64>,
}

/// `GET /orders[?farm_id=]`
pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<Vec<OrderModel>>> {
    let orders = match query.farm_id {
        Some(farm_id) => {
            profile::require_farm_owner(state.db.as_ref(), &session, farm_id).await?;
            order::list_orders_for_farm(&state.db, farm_id).await?
        }
        None => order::list_orders_for_buyer(&state.db, &session.user_id).await?,
    };
    Ok(Json(orders))
}

/// `GET /orders/:id`, visible to the buyer and the farm owner.
pub async fn get_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderModel>> {
    let found = order::get_order(state.db.as_ref(), order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;

    if !session.is(&found.buyer_id) {
        profile::require_farm_owner(state.db.as_ref(), &session, found.farm_id).await?;
    }
    Ok(Json(found))
}

/// `POST /orders/:id/confirm`
pub async fn confirm_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderModel>> {
    Ok(Json(order::confirm_order(&state.db, &session, order_id).await?))
}

/// Body of `POST /orders/:id/ship`.
#[derive(Debug, Default, Deserialize)]
pub struct ShipRequest {
    /// Carrier tracking number, required
    #[serde(default)]
    pub tracking_number: String,
    /// Carrier name
    #[serde(default)]
    pub carrier: Option<String>,
}

/// `POST /orders/:id/ship`
pub async fn ship_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
    ApiJson(body): ApiJson<ShipRequest>,
) -> ApiResult<Json<OrderModel>> {
    let shipped = order::ship_order(
        &state.db,
        &session,
        order_id,
        &body.tracking_number,
        body.carrier,
    )
    .await?;
    Ok(Json(shipped))
}

/// `POST /orders/:id/deliver`
pub async fn deliver_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderModel>> {
    Ok(Json(order::deliver_order(&state.db, &session, order_id).await?))
}

/// Body of `POST /orders/:id/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// Why the order is cancelled
    pub reason: String,
}

/// `POST /orders/:id/cancel`
pub async fn cancel_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
    ApiJson(body): ApiJson<CancelRequest>,
) -> ApiResult<Json<OrderModel>> {
    Ok(Json(
        order::cancel_order(&state.db, &session, order_id, &body.reason).await?,
    ))
}

/// Body of `POST /orders/:id/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// 1 to 5
    pub rating: i32,
    /// Free text
    #[serde(default)]
    pub comment: Option<String>,
}

/// `POST /orders/:id/review`
pub async fn review_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<i64>,
    ApiJson(body): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewModel>)> {
    let created =
        review::submit_review(&state.db, &session, order_id, body.rating, body.comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
