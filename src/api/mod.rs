//! HTTP surface of the marketplace.
//!
//! Two groups of routes live here: the sweep functions the scheduler invokes, and a
//! small JSON API over the core operations. API callers identify themselves with the
//! `X-User-Id` header (see [`session`]).

pub mod catalogue;
pub mod error;
pub mod notifications;
pub mod orders;
pub mod session;
pub mod sweeps;

use crate::config::credentials::ServiceCredentials;
use crate::core::sweep::SweepPolicy;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Thresholds used by the sweep jobs
    pub sweep_policy: SweepPolicy,
    /// Service credentials; sweeps refuse to run without them
    pub credentials: Option<ServiceCredentials>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(sweeps::routes())
        .merge(catalogue::routes())
        .merge(orders::routes())
        .merge(notifications::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl AppState {
    /// Creates state around a connection, with default sweep thresholds and no
    /// service credentials.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            sweep_policy: SweepPolicy::default(),
            credentials: None,
        }
    }

    /// Replaces the sweep thresholds.
    #[must_use]
    pub fn with_sweep_policy(mut self, sweep_policy: SweepPolicy) -> Self {
        self.sweep_policy = sweep_policy;
        self
    }

    /// Sets the service credentials the sweeps require.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<ServiceCredentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[cfg(test)]
pub(crate) fn test_state(
    db: DatabaseConnection,
    credentials: Option<ServiceCredentials>,
) -> AppState {
    AppState::new(db).with_credentials(credentials)
}
