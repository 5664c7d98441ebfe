//! Reservation entity - A hold on product stock created when a buyer orders.
//!
//! While a reservation is active or confirmed its quantity is subtracted from the
//! product's available stock. Releasing it gives the quantity back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a stock hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Holding stock, farm has not confirmed yet
    #[sea_orm(string_value = "active")]
    Active,
    /// Farm confirmed the linked order
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Stock returned to the product
    #[sea_orm(string_value = "released")]
    Released,
}

/// Reservation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product whose stock is held
    pub product_id: i64,
    /// Profile id of the buyer
    pub buyer_id: String,
    /// Kilograms held
    pub quantity_kg: f64,
    /// Current state
    pub status: ReservationStatus,
    /// When the hold was taken
    pub created_at: DateTimeUtc,
    /// When the hold last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation holds stock of one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
