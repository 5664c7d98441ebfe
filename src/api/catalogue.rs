//! Catalogue endpoints: cultivars, products, reservations and farm reviews.

use super::AppState;
use super::error::{ApiJson, ApiResult};
use crate::core::session::Session;
use crate::core::{cultivar, product, reservation, review};
use crate::entities::{CultivarModel, OrderModel, ProductModel, ReservationModel, ReviewModel};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Catalogue route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cultivars", get(list_cultivars))
        .route("/products", get(list_products))
        .route("/products/:id/reserve", post(reserve_product))
        .route("/reservations/:id/confirm", post(confirm_reservation))
        .route("/farms/:id/reviews", get(list_farm_reviews))
}

/// Query string of `GET /cultivars`.
#[derive(Debug, Default, Deserialize)]
pub struct CultivarQuery {
    /// Search term
    pub q: Option<String>,
}

/// `GET /cultivars[?q=term]`
pub async fn list_cultivars(
    State(state): State<AppState>,
    Query(query): Query<CultivarQuery>,
) -> ApiResult<Json<Vec<CultivarModel>>> {
    let cultivars = match query.q.as_deref() {
        Some(term) => cultivar::search_cultivars(&state.db, term).await?,
        None => cultivar::list_cultivars(&state.db).await?,
    };
    Ok(Json(cultivars))
}

/// `GET /products` lists active products.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductModel>>> {
    Ok(Json(product::list_active_products(&state.db).await?))
}

/// Body of `POST /products/:id/reserve`.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    /// Kilograms to reserve
    pub quantity_kg: f64,
}

/// Reservation together with the order it opened.
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    /// The stock hold
    pub reservation: ReservationModel,
    /// The pending order
    pub order: OrderModel,
}

/// `POST /products/:id/reserve`
pub async fn reserve_product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<i64>,
    ApiJson(body): ApiJson<ReserveRequest>,
) -> ApiResult<(StatusCode, Json<ReserveResponse>)> {
    let (reservation, order) =
        reservation::reserve_product(&state.db, &session, product_id, body.quantity_kg).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse { reservation, order }),
    ))
}

/// `POST /reservations/:id/confirm`
pub async fn confirm_reservation(
    State(state): State<AppState>,
    session: Session,
    Path(reservation_id): Path<i64>,
) -> ApiResult<Json<OrderModel>> {
    Ok(Json(
        reservation::confirm_reservation(&state.db, &session, reservation_id).await?,
    ))
}

/// Reviews of a farm with their average.
#[derive(Debug, Serialize)]
pub struct FarmReviews {
    /// Mean rating, absent until the first review
    pub average_rating: Option<f64>,
    /// Reviews, newest first
    pub reviews: Vec<ReviewModel>,
}

/// `GET /farms/:id/reviews`
pub async fn list_farm_reviews(
    State(state): State<AppState>,
    Path(farm_id): Path<i64>,
) -> ApiResult<Json<FarmReviews>> {
    let reviews = review::list_reviews_for_farm(&state.db, farm_id).await?;
    let average_rating = review::average_rating_for_farm(&state.db, farm_id).await?;
    Ok(Json(FarmReviews {
        average_rating,
        reviews,
    }))
}
