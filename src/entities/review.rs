//! Review entity - A buyer's rating of a delivered order. At most one per order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewed order, unique
    #[sea_orm(unique)]
    pub order_id: i64,
    /// Profile id of the reviewing buyer
    pub buyer_id: String,
    /// Farm being reviewed
    pub farm_id: i64,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Optional free text
    pub comment: Option<String>,
    /// When the review was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
