//! User role entity - Grants a profile one of the marketplace roles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roles a user can hold. A user may hold several.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Buys produce
    #[sea_orm(string_value = "buyer")]
    Buyer,
    /// Runs a farm and lists products
    #[sea_orm(string_value = "farmer")]
    Farmer,
    /// Platform administrator
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User role database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile holding the role
    pub user_id: String,
    /// The granted role
    pub role: AppRole,
}

/// Defines relationships between `UserRole` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each role row belongs to one profile
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
