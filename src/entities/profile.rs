//! Profile entity - One row per authenticated user of the marketplace.
//!
//! The `id` is the identifier issued by the external auth service, so it is stored
//! as text rather than generated locally.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Auth user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile has many roles
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRoles,
    /// One profile may own many farms
    #[sea_orm(has_many = "super::farm_profile::Entity")]
    FarmProfiles,
    /// One profile places many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::farm_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FarmProfiles.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
