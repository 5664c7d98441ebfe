//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs
//! without hand-written SQL. Creation is idempotent, which lets the server call it on
//! every start.

use crate::entities::{
    Cultivar, FarmProfile, Notification, Order, Product, Profile, Reservation, Review, UserRole,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::TableCreateStatement,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/banana_market.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection using `DATABASE_URL`, falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

/// Creates every marketplace table that does not exist yet.
///
/// Tables are created parents-first so foreign keys always point at an existing table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        table_for(&schema, Profile),
        table_for(&schema, UserRole),
        table_for(&schema, FarmProfile),
        table_for(&schema, Cultivar),
        table_for(&schema, Product),
        table_for(&schema, Reservation),
        table_for(&schema, Order),
        table_for(&schema, Review),
        table_for(&schema, Notification),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}
