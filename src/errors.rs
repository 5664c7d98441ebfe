//! Unified error type for the marketplace.
//!
//! Core operations return [`Result`]; the HTTP layer maps each variant onto a status
//! code in [`crate::api::error`].

use crate::entities::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Insufficient stock: {available} kg available, {requested} kg requested")]
    InsufficientStock { available: f64, requested: f64 },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("A tracking number is required to ship an order")]
    MissingTrackingNumber,

    #[error("Order {order_id} has already been reviewed")]
    ReviewAlreadyExists { order_id: i64 },

    #[error("Rating must be between 1 and 5, got {rating}")]
    InvalidRating { rating: i32 },

    #[error("Not allowed: {message}")]
    Forbidden { message: String },
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
