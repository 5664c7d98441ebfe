//! Cultivar knowledge base.
//!
//! Buyers browse cultivars to learn what they are ordering. The knowledge base is
//! seeded from `config.toml` and can be extended at runtime.

use crate::{
    config::settings::CultivarConfig,
    entities::{Cultivar, cultivar},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};

/// Lists all cultivars, ordered alphabetically.
pub async fn list_cultivars(db: &DatabaseConnection) -> Result<Vec<cultivar::Model>> {
    Cultivar::find()
        .order_by_asc(cultivar::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a cultivar by its exact name.
pub async fn get_cultivar_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<cultivar::Model>> {
    Cultivar::find()
        .filter(cultivar::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds cultivars whose name, scientific name or origin contains `term`.
///
/// A blank term returns the full list.
pub async fn search_cultivars(db: &DatabaseConnection, term: &str) -> Result<Vec<cultivar::Model>> {
    let term = term.trim();
    if term.is_empty() {
        return list_cultivars(db).await;
    }

    Cultivar::find()
        .filter(
            Condition::any()
                .add(cultivar::Column::Name.contains(term))
                .add(cultivar::Column::ScientificName.contains(term))
                .add(cultivar::Column::Origin.contains(term)),
        )
        .order_by_asc(cultivar::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a cultivar to the knowledge base.
///
/// # Errors
/// Returns `Validation` for a blank name or description, or a non-positive
/// `days_to_harvest`.
pub async fn create_cultivar(db: &DatabaseConnection, entry: CultivarConfig) -> Result<cultivar::Model> {
    if entry.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Cultivar name cannot be empty".to_string(),
        });
    }
    if entry.description.trim().is_empty() {
        return Err(Error::Validation {
            message: format!("Cultivar '{}' needs a description", entry.name.trim()),
        });
    }
    if let Some(days) = entry.days_to_harvest.filter(|days| *days <= 0) {
        return Err(Error::Validation {
            message: format!("days_to_harvest must be positive, got {days}"),
        });
    }

    let cultivar = cultivar::ActiveModel {
        name: Set(entry.name.trim().to_string()),
        scientific_name: Set(entry.scientific_name),
        origin: Set(entry.origin),
        description: Set(entry.description.trim().to_string()),
        days_to_harvest: Set(entry.days_to_harvest),
        ..Default::default()
    };
    cultivar.insert(db).await.map_err(Into::into)
}

/// Inserts every configured cultivar that is not in the database yet.
///
/// Returns the number of cultivars inserted.
pub async fn seed_cultivars(db: &DatabaseConnection, entries: &[CultivarConfig]) -> Result<usize> {
    let mut inserted = 0;
    for entry in entries {
        if get_cultivar_by_name(db, entry.name.trim()).await?.is_some() {
            continue;
        }
        create_cultivar(db, entry.clone()).await?;
        inserted += 1;
    }
    tracing::info!("Seeded {inserted} cultivars");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn entry(name: &str, origin: Option<&str>) -> CultivarConfig {
        CultivarConfig {
            name: name.to_string(),
            scientific_name: None,
            origin: origin.map(str::to_string),
            description: format!("{name} bananas"),
            days_to_harvest: Some(270),
        }
    }

    #[tokio::test]
    async fn test_create_cultivar_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_cultivar(&db, entry("  ", None)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut no_description = entry("Cavendish", None);
        no_description.description = String::new();
        let result = create_cultivar(&db, no_description).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut bad_days = entry("Cavendish", None);
        bad_days.days_to_harvest = Some(0);
        let result = create_cultivar(&db, bad_days).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_and_sorted() -> Result<()> {
        let db = setup_test_db().await?;
        let entries = vec![entry("Gros Michel", Some("Malaysia")), entry("Cavendish", Some("China"))];

        assert_eq!(seed_cultivars(&db, &entries).await?, 2);
        assert_eq!(seed_cultivars(&db, &entries).await?, 0);

        let all = list_cultivars(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Cavendish");
        assert_eq!(all[1].name, "Gros Michel");

        Ok(())
    }

    #[tokio::test]
    async fn test_search_matches_name_and_origin() -> Result<()> {
        let db = setup_test_db().await?;
        seed_cultivars(
            &db,
            &[entry("Gros Michel", Some("Malaysia")), entry("Cavendish", Some("China"))],
        )
        .await?;

        let by_name = search_cultivars(&db, "Michel").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Gros Michel");

        let by_origin = search_cultivars(&db, "China").await?;
        assert_eq!(by_origin.len(), 1);
        assert_eq!(by_origin[0].name, "Cavendish");

        assert_eq!(search_cultivars(&db, " ").await?.len(), 2);
        assert!(get_cultivar_by_name(&db, "Cavendish").await?.is_some());

        Ok(())
    }
}
