//! Order lifecycle business logic.
//!
//! Orders move pending → confirmed → shipped → delivered → reviewed, and may be
//! cancelled while pending or confirmed. Each operation here loads the order, checks the
//! caller may act on it, applies exactly one transition and notifies the other party,
//! all inside one database transaction.
//!
//! Cancellation is a guarded update (`... WHERE status IN (...)`) so it is safe to race
//! against the sweep jobs in [`crate::core::sweep`].

use crate::{
    core::{notification, profile::require_farm_owner, reservation, session::Session},
    entities::{Order, OrderStatus, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Retrieves an order by id.
pub async fn get_order<C>(db: &C, order_id: i64) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a buyer's orders, newest first.
pub async fn list_orders_for_buyer(
    db: &DatabaseConnection,
    buyer_id: &str,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::BuyerId.eq(buyer_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a farm's orders, newest first.
pub async fn list_orders_for_farm(
    db: &DatabaseConnection,
    farm_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::FarmId.eq(farm_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fails with `InvalidTransition` unless `next` directly follows the order's status.
pub fn ensure_transition(current: &order::Model, next: OrderStatus) -> Result<()> {
    if current.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: current.status,
            to: next,
        })
    }
}

/// Moves an order to `next`, stamping the matching timestamp column.
///
/// `extra` may set further columns (tracking number, carrier) before the write.
pub(crate) async fn apply_transition<C, F>(
    db: &C,
    current: order::Model,
    next: OrderStatus,
    now: DateTime<Utc>,
    extra: F,
) -> Result<order::Model>
where
    C: ConnectionTrait,
    F: FnOnce(&mut order::ActiveModel),
{
    ensure_transition(&current, next)?;

    let mut active: order::ActiveModel = current.into();
    active.status = Set(next);
    active.updated_at = Set(now);
    match next {
        OrderStatus::Confirmed => active.confirmed_at = Set(Some(now)),
        OrderStatus::Shipped => active.shipped_at = Set(Some(now)),
        OrderStatus::Delivered => active.delivered_at = Set(Some(now)),
        OrderStatus::Cancelled => active.cancelled_at = Set(Some(now)),
        OrderStatus::Reviewed => active.reviewed_at = Set(Some(now)),
        OrderStatus::Pending => {}
    }
    extra(&mut active);

    active.update(db).await.map_err(Into::into)
}

/// Cancels an order if, and only if, its stored status is one of `expected`.
///
/// Returns false when the row no longer matched (someone else moved it first). On
/// success the linked reservation is released.
pub(crate) async fn cancel_guarded<C>(
    db: &C,
    current: &order::Model,
    expected: &[OrderStatus],
    reason: &str,
    now: DateTime<Utc>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let updated = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
        .col_expr(
            order::Column::CancellationReason,
            Expr::value(reason.to_string()),
        )
        .col_expr(order::Column::CancelledAt, Expr::value(now))
        .col_expr(order::Column::UpdatedAt, Expr::value(now))
        .filter(order::Column::Id.eq(current.id))
        .filter(order::Column::Status.is_in(expected.iter().copied()))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        return Ok(false);
    }

    if let Some(reservation_id) = current.reservation_id {
        reservation::release(db, reservation_id).await?;
    }
    Ok(true)
}

async fn load_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    get_order(db, order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))
}

/// Farm accepts a pending order.
///
/// # Errors
/// `NotFound`, `Forbidden` unless the caller owns the farm, or `InvalidTransition`
/// unless the order is pending.
pub async fn confirm_order(
    db: &DatabaseConnection,
    session: &Session,
    order_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let current = load_order(&txn, order_id).await?;
    require_farm_owner(&txn, session, current.farm_id).await?;

    let reservation_id = current.reservation_id;
    let confirmed =
        apply_transition(&txn, current, OrderStatus::Confirmed, Utc::now(), |_| {}).await?;
    if let Some(reservation_id) = reservation_id {
        reservation::mark_confirmed(&txn, reservation_id).await?;
    }

    notification::create_notification(
        &txn,
        &confirmed.buyer_id,
        Some(confirmed.id),
        "Order confirmed",
        &format!("Your order #{} was confirmed by the farm.", confirmed.id),
    )
    .await?;

    txn.commit().await?;
    tracing::info!(order_id, "Order confirmed");
    Ok(confirmed)
}

/// Farm hands a confirmed order to a carrier.
///
/// The tracking number is checked before the store is touched.
///
/// # Errors
/// `MissingTrackingNumber` for a blank tracking number, otherwise as
/// [`confirm_order`] (the order must be confirmed).
pub async fn ship_order(
    db: &DatabaseConnection,
    session: &Session,
    order_id: i64,
    tracking_number: &str,
    carrier: Option<String>,
) -> Result<order::Model> {
    let tracking_number = tracking_number.trim().to_string();
    if tracking_number.is_empty() {
        return Err(Error::MissingTrackingNumber);
    }
    let carrier = carrier
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let txn = db.begin().await?;
    let current = load_order(&txn, order_id).await?;
    require_farm_owner(&txn, session, current.farm_id).await?;

    let shipped = apply_transition(&txn, current, OrderStatus::Shipped, Utc::now(), |active| {
        active.tracking_number = Set(Some(tracking_number.clone()));
        active.carrier = Set(carrier.clone());
    })
    .await?;

    let via = carrier
        .as_deref()
        .map(|c| format!(" via {c}"))
        .unwrap_or_default();
    notification::create_notification(
        &txn,
        &shipped.buyer_id,
        Some(shipped.id),
        "Order shipped",
        &format!(
            "Order #{} is on its way{via}. Tracking number: {tracking_number}",
            shipped.id
        ),
    )
    .await?;

    txn.commit().await?;
    tracing::info!(order_id, "Order shipped");
    Ok(shipped)
}

/// Farm records that a shipped order arrived.
pub async fn deliver_order(
    db: &DatabaseConnection,
    session: &Session,
    order_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let current = load_order(&txn, order_id).await?;
    require_farm_owner(&txn, session, current.farm_id).await?;

    let delivered =
        apply_transition(&txn, current, OrderStatus::Delivered, Utc::now(), |_| {}).await?;

    notification::create_notification(
        &txn,
        &delivered.buyer_id,
        Some(delivered.id),
        "Order delivered",
        &format!(
            "Order #{} was delivered. Let the farm know how it went by leaving a review.",
            delivered.id
        ),
    )
    .await?;

    txn.commit().await?;
    tracing::info!(order_id, "Order delivered");
    Ok(delivered)
}

/// Buyer or farm cancels an order that has not shipped yet.
///
/// The linked reservation is released and the other party is notified.
///
/// # Errors
/// `Validation` for a blank reason, `NotFound`, `Forbidden` unless the caller is the
/// buyer or the farm owner, `InvalidTransition` once the order has shipped.
pub async fn cancel_order(
    db: &DatabaseConnection,
    session: &Session,
    order_id: i64,
    reason: &str,
) -> Result<order::Model> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::Validation {
            message: "A cancellation reason is required".to_string(),
        });
    }

    let txn = db.begin().await?;
    let current = load_order(&txn, order_id).await?;
    let farm = crate::core::profile::get_farm_profile(&txn, current.farm_id)
        .await?
        .ok_or_else(|| Error::not_found("farm", current.farm_id))?;

    let recipient = if session.is(&current.buyer_id) {
        farm.owner_id.clone()
    } else if session.is(&farm.owner_id) {
        current.buyer_id.clone()
    } else {
        return Err(Error::forbidden(
            "only the buyer or the farm can cancel an order",
        ));
    };

    ensure_transition(&current, OrderStatus::Cancelled)?;
    if !cancel_guarded(&txn, &current, &OrderStatus::CANCELLABLE, reason, Utc::now()).await? {
        return Err(Error::InvalidTransition {
            from: current.status,
            to: OrderStatus::Cancelled,
        });
    }

    notification::create_notification(
        &txn,
        &recipient,
        Some(current.id),
        "Order cancelled",
        &format!("Order #{} was cancelled: {reason}", current.id),
    )
    .await?;

    let cancelled = load_order(&txn, order_id).await?;
    txn.commit().await?;
    tracing::info!(order_id, "Order cancelled by {}", session.user_id);
    Ok(cancelled)
}
