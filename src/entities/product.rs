//! Product entity - A harvest lot a farm offers for sale.
//!
//! Stock is tracked in kilograms. The `harvest_date` drives the post-harvest
//! cancellation sweep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Farm selling the product
    pub farm_id: i64,
    /// Cultivar this lot belongs to, if recorded
    pub cultivar_id: Option<i64>,
    /// Listing name (e.g., "Cavendish - export grade")
    pub name: String,
    /// Price per kilogram
    pub price_per_kg: f64,
    /// Kilograms still available to reserve
    pub quantity_available_kg: f64,
    /// Date the lot is (or was) harvested
    pub harvest_date: Date,
    /// Inactive products are hidden from the catalogue
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one farm
    #[sea_orm(
        belongs_to = "super::farm_profile::Entity",
        from = "Column::FarmId",
        to = "super::farm_profile::Column::Id"
    )]
    Farm,
    /// Each product may reference a cultivar
    #[sea_orm(
        belongs_to = "super::cultivar::Entity",
        from = "Column::CultivarId",
        to = "super::cultivar::Column::Id"
    )]
    Cultivar,
    /// One product has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One product has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::farm_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl Related<super::cultivar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cultivar.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
