/// Database configuration and connection management
pub mod database;

/// Settings and cultivar seed data loaded from config.toml
pub mod settings;

/// Service credentials for the sweep handlers, from environment variables
pub mod credentials;
