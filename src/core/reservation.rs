//! Reservations - stock holds taken when a buyer orders a product.
//!
//! `reserve_product` takes the stock, records the hold and opens a pending order in one
//! database transaction. The hold is confirmed together with its order and released
//! (stock returned) when the order is cancelled.

use crate::{
    core::{notification, order, profile, session::Session},
    entities::{Order, OrderStatus, Reservation, ReservationStatus, order as order_entity, reservation},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Reserves `quantity_kg` of a product for the caller and opens a pending order.
///
/// The farm owner is notified of the new order.
///
/// # Errors
/// Returns an error if:
/// - The quantity is zero, negative or not finite
/// - The product does not exist or is inactive
/// - The product has less stock than requested
pub async fn reserve_product(
    db: &DatabaseConnection,
    session: &Session,
    product_id: i64,
    quantity_kg: f64,
) -> Result<(reservation::Model, order_entity::Model)> {
    if quantity_kg <= 0.0 || !quantity_kg.is_finite() {
        return Err(Error::InvalidAmount {
            amount: quantity_kg,
        });
    }

    let txn = db.begin().await?;

    let product = crate::core::product::get_product_by_id(&txn, product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| Error::not_found("product", product_id))?;

    if quantity_kg > product.quantity_available_kg {
        return Err(Error::InsufficientStock {
            available: product.quantity_available_kg,
            requested: quantity_kg,
        });
    }

    let farm = profile::get_farm_profile(&txn, product.farm_id)
        .await?
        .ok_or_else(|| Error::not_found("farm", product.farm_id))?;

    crate::core::product::adjust_stock_atomic(&txn, product_id, -quantity_kg).await?;

    let now = chrono::Utc::now();
    let hold = reservation::ActiveModel {
        product_id: Set(product_id),
        buyer_id: Set(session.user_id.clone()),
        quantity_kg: Set(quantity_kg),
        status: Set(ReservationStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let placed = order_entity::ActiveModel {
        buyer_id: Set(session.user_id.clone()),
        farm_id: Set(product.farm_id),
        product_id: Set(product_id),
        reservation_id: Set(Some(hold.id)),
        quantity_kg: Set(quantity_kg),
        total_price: Set(quantity_kg * product.price_per_kg),
        status: Set(OrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    notification::create_notification(
        &txn,
        &farm.owner_id,
        Some(placed.id),
        "New order",
        &format!(
            "A buyer reserved {:.1} kg of {}. Unconfirmed orders are cancelled automatically.",
            quantity_kg, product.name
        ),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = placed.id,
        reservation_id = hold.id,
        "Reserved {quantity_kg} kg of product {product_id}"
    );
    Ok((hold, placed))
}

/// Confirms a reservation by confirming the order placed with it.
///
/// # Errors
/// Returns `NotFound` when no order references the reservation, plus any error of
/// [`order::confirm_order`].
pub async fn confirm_reservation(
    db: &DatabaseConnection,
    session: &Session,
    reservation_id: i64,
) -> Result<order_entity::Model> {
    let linked = Order::find()
        .filter(order_entity::Column::ReservationId.eq(reservation_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("reservation", reservation_id))?;

    order::confirm_order(db, session, linked.id).await
}

/// Retrieves a reservation by id.
pub async fn get_reservation<C>(db: &C, reservation_id: i64) -> Result<Option<reservation::Model>>
where
    C: ConnectionTrait,
{
    Reservation::find_by_id(reservation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Marks an active reservation confirmed. Other states are left alone.
pub(crate) async fn mark_confirmed<C>(db: &C, reservation_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Reservation::update_many()
        .col_expr(
            reservation::Column::Status,
            Expr::value(ReservationStatus::Confirmed),
        )
        .col_expr(reservation::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(reservation::Column::Id.eq(reservation_id))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active))
        .exec(db)
        .await?;
    Ok(())
}

/// Releases a held reservation and returns its quantity to the product.
///
/// Returns false if the reservation was already released.
pub(crate) async fn release<C>(db: &C, reservation_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let Some(hold) = get_reservation(db, reservation_id).await? else {
        return Ok(false);
    };

    let updated = Reservation::update_many()
        .col_expr(
            reservation::Column::Status,
            Expr::value(ReservationStatus::Released),
        )
        .col_expr(reservation::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(reservation::Column::Id.eq(reservation_id))
        .filter(
            reservation::Column::Status
                .is_in([ReservationStatus::Active, ReservationStatus::Confirmed]),
        )
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        return Ok(false);
    }

    crate::core::product::adjust_stock_atomic(db, hold.product_id, hold.quantity_kg).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::product::get_product_by_id;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_reserve_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let session = Session::new("buyer-1");

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = reserve_product(&db, &session, 1, bad).await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_takes_stock_and_opens_order() -> Result<()> {
        let fx = setup_marketplace().await?;

        let (hold, placed) =
            reserve_product(&fx.db, &Session::new(BUYER), fx.product.id, 40.0).await?;

        assert_eq!(hold.status, ReservationStatus::Active);
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.reservation_id, Some(hold.id));
        assert_eq!(placed.total_price, 40.0 * fx.product.price_per_kg);

        let product = get_product_by_id(&fx.db, fx.product.id).await?.unwrap();
        assert_eq!(product.quantity_available_kg, fx.product.quantity_available_kg - 40.0);

        let farm_notes = notification::list_notifications_for_user(&fx.db, FARMER).await?;
        assert_eq!(farm_notes.len(), 1);
        assert_eq!(farm_notes[0].order_id, Some(placed.id));
        assert_eq!(
            farm_notes[0].message,
            format!(
                "A buyer reserved 40.0 kg of {}. Unconfirmed orders are cancelled automatically.",
                fx.product.name
            )
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_insufficient_stock_changes_nothing() -> Result<()> {
        let fx = setup_marketplace().await?;

        let result = reserve_product(&fx.db, &Session::new(BUYER), fx.product.id, 10_000.0).await;
        assert!(matches!(result, Err(Error::InsufficientStock { .. })));

        let product = get_product_by_id(&fx.db, fx.product.id).await?.unwrap();
        assert_eq!(product.quantity_available_kg, fx.product.quantity_available_kg);
        assert_eq!(Order::find().count(&fx.db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_reservation_confirms_order() -> Result<()> {
        let fx = setup_marketplace().await?;
        let (hold, _) = reserve_product(&fx.db, &Session::new(BUYER), fx.product.id, 5.0).await?;

        let confirmed = confirm_reservation(&fx.db, &Session::new(FARMER), hold.id).await?;
        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let hold = get_reservation(&fx.db, hold.id).await?.unwrap();
        assert_eq!(hold.status, ReservationStatus::Confirmed);

        let missing = confirm_reservation(&fx.db, &Session::new(FARMER), 999).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_release_returns_stock_once() -> Result<()> {
        let fx = setup_marketplace().await?;
        let (hold, _) = reserve_product(&fx.db, &Session::new(BUYER), fx.product.id, 25.0).await?;

        assert!(release(&fx.db, hold.id).await?);
        assert!(!release(&fx.db, hold.id).await?);

        let product = get_product_by_id(&fx.db, fx.product.id).await?.unwrap();
        assert_eq!(product.quantity_available_kg, fx.product.quantity_available_kg);

        Ok(())
    }
}
