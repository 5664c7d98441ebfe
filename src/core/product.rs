//! Product business logic - Handles all product-related operations.
//!
//! Products are harvest lots listed by a farm. Stock is kept in kilograms on the product
//! row and only ever changed through [`adjust_stock_atomic`], so reservations and
//! releases compose inside a single database transaction.

use crate::{
    core::{profile::require_farm_owner, session::Session},
    entities::{Product, product},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Deserialize;

/// Fields a farm supplies when listing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Farm the product is listed under
    pub farm_id: i64,
    /// Cultivar, if known
    #[serde(default)]
    pub cultivar_id: Option<i64>,
    /// Listing name
    pub name: String,
    /// Price per kilogram
    pub price_per_kg: f64,
    /// Kilograms on offer
    pub quantity_kg: f64,
    /// Harvest date of the lot
    pub harvest_date: NaiveDate,
}

fn validate_new_product(new_product: &NewProduct) -> Result<()> {
    if new_product.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if new_product.price_per_kg < 0.0 || !new_product.price_per_kg.is_finite() {
        return Err(Error::InvalidAmount {
            amount: new_product.price_per_kg,
        });
    }

    if new_product.quantity_kg < 0.0 || !new_product.quantity_kg.is_finite() {
        return Err(Error::InvalidAmount {
            amount: new_product.quantity_kg,
        });
    }

    Ok(())
}

/// Lists a new product for one of the caller's farms.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price or quantity is negative or not finite (NaN, infinity)
/// - The farm does not exist or is not owned by the caller
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    session: &Session,
    new_product: NewProduct,
) -> Result<product::Model> {
    validate_new_product(&new_product)?;
    require_farm_owner(db, session, new_product.farm_id).await?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        farm_id: Set(new_product.farm_id),
        cultivar_id: Set(new_product.cultivar_id),
        name: Set(new_product.name.trim().to_string()),
        price_per_kg: Set(new_product.price_per_kg),
        quantity_available_kg: Set(new_product.quantity_kg),
        harvest_date: Set(new_product.harvest_date),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Retrieves a product by its id, active or not.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists active products, soonest harvest first.
pub async fn list_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::HarvestDate)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every product of a farm, including inactive ones.
pub async fn list_products_for_farm(
    db: &DatabaseConnection,
    farm_id: i64,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::FarmId.eq(farm_id))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Hides a product from the catalogue. Existing orders are unaffected.
///
/// # Errors
/// Returns `NotFound` if the product does not exist or is already inactive, and
/// `Forbidden` if the caller does not own the farm.
pub async fn deactivate_product(
    db: &DatabaseConnection,
    session: &Session,
    product_id: i64,
) -> Result<product::Model> {
    let existing = get_product_by_id(db, product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| Error::not_found("product", product_id))?;
    require_farm_owner(db, session, existing.farm_id).await?;

    let mut active: product::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Atomically adds `delta_kg` to a product's available stock.
///
/// Negative deltas take stock, positive deltas return it.
pub(crate) async fn adjust_stock_atomic<C>(
    db: &C,
    product_id: i64,
    delta_kg: f64,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::update_many()
        .col_expr(
            product::Column::QuantityAvailableKg,
            Expr::col(product::Column::QuantityAvailableKg).add(delta_kg),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("product", product_id))
}
