//! Order entity - A buyer's purchase of a quantity of one product from one farm.
//!
//! Orders move through a fixed lifecycle, see [`OrderStatus::can_transition_to`].
//! Every transition stamps its own timestamp column so the history of an order can be
//! read straight off the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the buyer, awaiting the farm
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the farm
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Handed to a carrier
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Received by the buyer
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Cancelled by a party or by a sweep job
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Delivered and reviewed by the buyer
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
}

impl OrderStatus {
    /// Statuses from which an order may still be cancelled.
    pub const CANCELLABLE: [Self; 2] = [Self::Pending, Self::Confirmed];

    /// Returns true when `next` directly follows `self` in the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
                | (Self::Delivered, Self::Reviewed)
        )
    }

    /// Returns true when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Reviewed)
    }

    /// Lowercase name, matching the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Reviewed => "reviewed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile id of the buyer
    pub buyer_id: String,
    /// Farm fulfilling the order
    pub farm_id: i64,
    /// Product ordered
    pub product_id: i64,
    /// Reservation holding the stock, when the order was placed through one
    pub reservation_id: Option<i64>,
    /// Ordered quantity in kilograms
    pub quantity_kg: f64,
    /// Quantity times the price per kilogram at the time of ordering
    pub total_price: f64,
    /// Current lifecycle state
    pub status: OrderStatus,
    /// Why the order was cancelled
    pub cancellation_reason: Option<String>,
    /// Carrier tracking number, set on shipment
    pub tracking_number: Option<String>,
    /// Carrier name, optional on shipment
    pub carrier: Option<String>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
    /// Set on pending -> confirmed
    pub confirmed_at: Option<DateTimeUtc>,
    /// Set on confirmed -> shipped
    pub shipped_at: Option<DateTimeUtc>,
    /// Set on shipped -> delivered
    pub delivered_at: Option<DateTimeUtc>,
    /// Set on any -> cancelled
    pub cancelled_at: Option<DateTimeUtc>,
    /// Set on delivered -> reviewed
    pub reviewed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order is placed by one buyer
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::BuyerId",
        to = "super::profile::Column::Id"
    )]
    Buyer,
    /// Each order is fulfilled by one farm
    #[sea_orm(
        belongs_to = "super::farm_profile::Entity",
        from = "Column::FarmId",
        to = "super::farm_profile::Column::Id"
    )]
    Farm,
    /// Each order is for one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// An order has at most one review
    #[sea_orm(has_one = "super::review::Entity")]
    Review,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buyer.def()
    }
}

impl Related<super::farm_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
