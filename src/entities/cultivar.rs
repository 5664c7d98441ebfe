//! Cultivar entity - Knowledge-base entry describing a banana variety.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cultivar database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cultivars")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Common name (e.g., "Cavendish")
    #[sea_orm(unique)]
    pub name: String,
    /// Botanical name, if known
    pub scientific_name: Option<String>,
    /// Region of origin, if known
    pub origin: Option<String>,
    /// Knowledge-base text
    pub description: String,
    /// Typical days from planting to harvest
    pub days_to_harvest: Option<i32>,
}

/// Defines relationships between Cultivar and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One cultivar is sold as many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
