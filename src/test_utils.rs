//! Shared test utilities for the marketplace.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        product::{self, NewProduct},
        profile,
        session::Session,
    },
    entities::{self, AppRole, OrderStatus},
    errors::Result,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Profile id of the buyer in [`setup_marketplace`].
pub const BUYER: &str = "buyer-1";
/// Profile id of the farm owner in [`setup_marketplace`].
pub const FARMER: &str = "farmer-1";

/// Price per kg of products created by these helpers.
pub const TEST_PRICE_PER_KG: f64 = 2.5;

/// A database with one buyer, one farm and one product in stock.
pub struct Marketplace {
    /// Database connection
    pub db: DatabaseConnection,
    /// The farm, owned by [`FARMER`]
    pub farm: entities::farm_profile::Model,
    /// A product of the farm, harvest two weeks from now, 1000 kg available
    pub product: entities::product::Model,
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a profile for `user_id` unless one already exists.
///
/// # Defaults
/// * `full_name`: the user id
/// * `email`: `"<user_id>@example.com"`
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::profile::Model> {
    if let Some(existing) = profile::get_profile(db, user_id).await? {
        return Ok(existing);
    }
    profile::create_profile(
        db,
        user_id.to_string(),
        user_id.to_string(),
        format!("{user_id}@example.com"),
        None,
    )
    .await
}

/// Creates a farmer profile and a farm owned by it.
pub async fn create_test_farm(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<entities::farm_profile::Model> {
    create_test_profile(db, owner_id).await?;
    profile::assign_role(db, owner_id, AppRole::Farmer).await?;
    profile::create_farm_profile(
        db,
        &Session::new(owner_id),
        "Finca Test".to_string(),
        "Guayas, Ecuador".to_string(),
        None,
    )
    .await
}

/// Creates a product for `farm_id` with [`TEST_PRICE_PER_KG`] and a harvest two weeks out.
pub async fn create_test_product(
    db: &DatabaseConnection,
    farm_id: i64,
    quantity_kg: f64,
) -> Result<entities::product::Model> {
    let harvest_date = Utc::now().date_naive() + Duration::days(14);
    create_custom_product(db, farm_id, quantity_kg, harvest_date).await
}

/// Creates a product with a custom harvest date.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    farm_id: i64,
    quantity_kg: f64,
    harvest_date: NaiveDate,
) -> Result<entities::product::Model> {
    let farm = profile::get_farm_profile(db, farm_id)
        .await?
        .ok_or_else(|| crate::errors::Error::not_found("farm", farm_id))?;
    product::create_product(
        db,
        &Session::new(farm.owner_id),
        NewProduct {
            farm_id,
            cultivar_id: None,
            name: format!("Test Lot {harvest_date}"),
            price_per_kg: TEST_PRICE_PER_KG,
            quantity_kg,
            harvest_date,
        },
    )
    .await
}

/// Sets up a complete marketplace: buyer, farm and a product with 1000 kg in stock.
pub async fn setup_marketplace() -> Result<Marketplace> {
    let db = setup_test_db().await?;
    create_test_profile(&db, BUYER).await?;
    profile::assign_role(&db, BUYER, AppRole::Buyer).await?;
    let farm = create_test_farm(&db, FARMER).await?;
    let product = create_test_product(&db, farm.id, 1000.0).await?;
    Ok(Marketplace { db, farm, product })
}

/// Creates a product of the marketplace farm harvested on `harvest_date`.
pub async fn create_product_harvested(
    fx: &Marketplace,
    harvest_date: NaiveDate,
) -> Result<entities::product::Model> {
    create_custom_product(&fx.db, fx.farm.id, 1000.0, harvest_date).await
}

/// Inserts an order for [`BUYER`] directly in the given status, created now.
///
/// No reservation is taken and no notification is written.
pub async fn create_test_order(
    fx: &Marketplace,
    status: OrderStatus,
) -> Result<entities::order::Model> {
    create_order_at(fx, fx.product.id, status, Utc::now()).await
}

/// Inserts an order for [`BUYER`] directly, with a custom product, status and creation time.
///
/// # Defaults
/// * `quantity_kg`: 10.0
pub async fn create_order_at(
    fx: &Marketplace,
    product_id: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
) -> Result<entities::order::Model> {
    let quantity_kg = 10.0;
    let order = entities::order::ActiveModel {
        buyer_id: Set(BUYER.to_string()),
        farm_id: Set(fx.farm.id),
        product_id: Set(product_id),
        reservation_id: Set(None),
        quantity_kg: Set(quantity_kg),
        total_price: Set(quantity_kg * TEST_PRICE_PER_KG),
        status: Set(status),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    };
    order.insert(&fx.db).await.map_err(Into::into)
}

/// Reads a response body as JSON.
///
/// # Panics
/// Panics if the body cannot be read or is not JSON.
#[allow(clippy::unwrap_used)]
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
