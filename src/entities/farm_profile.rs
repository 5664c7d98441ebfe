//! Farm profile entity - A banana farm selling through the marketplace.
//!
//! Each farm is owned by a single profile. Notifications addressed to "the farm"
//! are delivered to that owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Farm profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farm_profiles")]
pub struct Model {
    /// Unique identifier for the farm
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile id of the farm owner
    pub owner_id: String,
    /// Public farm name
    pub farm_name: String,
    /// Free-form location (region, country)
    pub location: String,
    /// Optional description shown to buyers
    pub description: Option<String>,
    /// When the farm was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `FarmProfile` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each farm belongs to one owner profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::OwnerId",
        to = "super::profile::Column::Id"
    )]
    Owner,
    /// One farm lists many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    /// One farm receives many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
