//! Notification entity - A message shown to a user, usually about one of their orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient profile id
    pub user_id: String,
    /// Order the message is about, if any
    pub order_id: Option<i64>,
    /// Short headline
    pub title: String,
    /// Message body
    pub message: String,
    /// Whether the recipient has seen it
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// Notifications are not linked through relations; the recipient may be any profile.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
