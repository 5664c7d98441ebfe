//! Profile, role and farm business logic.
//!
//! Profiles mirror users of the external auth service. Roles gate what a profile may
//! do; only farmers can register a farm.

use crate::{
    core::session::Session,
    entities::{AppRole, FarmProfile, Profile, UserRole, farm_profile, profile, user_role},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a profile for an authenticated user.
///
/// # Errors
/// Returns `Validation` if the id, name or email is blank, or a database error if the
/// id is already taken.
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: String,
    full_name: String,
    email: String,
    phone: Option<String>,
) -> Result<profile::Model> {
    if user_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "User id cannot be empty".to_string(),
        });
    }
    if full_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Full name cannot be empty".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(Error::Validation {
            message: format!("Invalid email address: {email}"),
        });
    }

    let profile = profile::ActiveModel {
        id: Set(user_id),
        full_name: Set(full_name.trim().to_string()),
        email: Set(email.trim().to_string()),
        phone: Set(phone),
        created_at: Set(chrono::Utc::now()),
    };
    profile.insert(db).await.map_err(Into::into)
}

/// Retrieves a profile by id.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<Option<profile::Model>> {
    Profile::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Grants `role` to a user. Granting a role the user already holds is a no-op.
pub async fn assign_role(
    db: &DatabaseConnection,
    user_id: &str,
    role: AppRole,
) -> Result<user_role::Model> {
    let existing = UserRole::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .filter(user_role::Column::Role.eq(role))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        return Ok(existing);
    }

    let grant = user_role::ActiveModel {
        user_id: Set(user_id.to_string()),
        role: Set(role),
        ..Default::default()
    };
    grant.insert(db).await.map_err(Into::into)
}

/// Lists the roles a user holds.
pub async fn get_roles<C>(db: &C, user_id: &str) -> Result<Vec<AppRole>>
where
    C: ConnectionTrait,
{
    let rows = UserRole::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|row| row.role).collect())
}

/// Returns true when the user holds `role`.
pub async fn has_role<C>(db: &C, user_id: &str, role: AppRole) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_roles(db, user_id).await?.contains(&role))
}

/// Registers a farm owned by the caller.
///
/// # Errors
/// Returns `Forbidden` if the caller lacks the farmer role and `Validation` for a blank
/// name or location.
pub async fn create_farm_profile(
    db: &DatabaseConnection,
    session: &Session,
    farm_name: String,
    location: String,
    description: Option<String>,
) -> Result<farm_profile::Model> {
    if farm_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Farm name cannot be empty".to_string(),
        });
    }
    if location.trim().is_empty() {
        return Err(Error::Validation {
            message: "Farm location cannot be empty".to_string(),
        });
    }
    if !has_role(db, &session.user_id, AppRole::Farmer).await? {
        return Err(Error::forbidden("only farmers can register a farm"));
    }

    let farm = farm_profile::ActiveModel {
        owner_id: Set(session.user_id.clone()),
        farm_name: Set(farm_name.trim().to_string()),
        location: Set(location.trim().to_string()),
        description: Set(description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    farm.insert(db).await.map_err(Into::into)
}

/// Retrieves a farm by id.
pub async fn get_farm_profile<C>(db: &C, farm_id: i64) -> Result<Option<farm_profile::Model>>
where
    C: ConnectionTrait,
{
    FarmProfile::find_by_id(farm_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the first farm owned by a user, if any.
pub async fn get_farm_for_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Option<farm_profile::Model>> {
    FarmProfile::find()
        .filter(farm_profile::Column::OwnerId.eq(owner_id))
        .order_by_asc(farm_profile::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all farms, ordered by name.
pub async fn list_farms(db: &DatabaseConnection) -> Result<Vec<farm_profile::Model>> {
    FarmProfile::find()
        .order_by_asc(farm_profile::Column::FarmName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a farm and checks the caller owns it.
pub(crate) async fn require_farm_owner<C>(
    db: &C,
    session: &Session,
    farm_id: i64,
) -> Result<farm_profile::Model>
where
    C: ConnectionTrait,
{
    let farm = get_farm_profile(db, farm_id)
        .await?
        .ok_or_else(|| Error::not_found("farm", farm_id))?;
    if !session.is(&farm.owner_id) {
        return Err(Error::forbidden("only the farm owner can do this"));
    }
    Ok(farm)
}
