//! Review business logic.
//!
//! A buyer may review a delivered order exactly once. Submitting the review moves the
//! order to `reviewed`.

use crate::{
    core::{notification, order as order_logic, profile, session::Session},
    entities::{OrderStatus, Review, review},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Records the buyer's review of a delivered order.
///
/// # Errors
/// Returns an error if:
/// - The rating is outside 1..=5
/// - The order does not exist
/// - The caller is not the buyer
/// - The order already has a review
/// - The order has not been delivered
pub async fn submit_review(
    db: &DatabaseConnection,
    session: &Session,
    order_id: i64,
    rating: i32,
    comment: Option<String>,
) -> Result<review::Model> {
    if !(1..=5).contains(&rating) {
        return Err(Error::InvalidRating { rating });
    }
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let txn = db.begin().await?;

    let current = order_logic::get_order(&txn, order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?;

    if !session.is(&current.buyer_id) {
        return Err(Error::forbidden("only the buyer can review an order"));
    }

    if get_review_for_order(&txn, order_id).await?.is_some() {
        return Err(Error::ReviewAlreadyExists { order_id });
    }

    let now = Utc::now();
    let farm_id = current.farm_id;
    let reviewed =
        order_logic::apply_transition(&txn, current, OrderStatus::Reviewed, now, |_| {}).await?;

    let created = review::ActiveModel {
        order_id: Set(order_id),
        buyer_id: Set(session.user_id.clone()),
        farm_id: Set(farm_id),
        rating: Set(rating),
        comment: Set(comment),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(farm) = profile::get_farm_profile(&txn, farm_id).await? {
        notification::create_notification(
            &txn,
            &farm.owner_id,
            Some(reviewed.id),
            "New review",
            &format!("Order #{} was rated {rating}/5.", reviewed.id),
        )
        .await?;
    }

    txn.commit().await?;
    tracing::info!(order_id, rating, "Review submitted");
    Ok(created)
}

/// Retrieves the review of an order, if one exists.
pub async fn get_review_for_order<C>(db: &C, order_id: i64) -> Result<Option<review::Model>>
where
    C: ConnectionTrait,
{
    Review::find()
        .filter(review::Column::OrderId.eq(order_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a farm's reviews, newest first.
pub async fn list_reviews_for_farm(
    db: &DatabaseConnection,
    farm_id: i64,
) -> Result<Vec<review::Model>> {
    Review::find()
        .filter(review::Column::FarmId.eq(farm_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Average rating of a farm, or `None` if it has no reviews yet.
pub async fn average_rating_for_farm(db: &DatabaseConnection, farm_id: i64) -> Result<Option<f64>> {
    let reviews = list_reviews_for_farm(db, farm_id).await?;
    if reviews.is_empty() {
        return Ok(None);
    }
    let total: i32 = reviews.iter().map(|r| r.rating).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = f64::from(total) / reviews.len() as f64;
    Ok(Some(average))
}
