//! Core business logic - framework-agnostic marketplace operations.
//!
//! Every function takes the database connection explicitly, and user-facing
//! operations also take the caller's [`session::Session`].

/// Cultivar knowledge base
pub mod cultivar;
/// User notifications
pub mod notification;
/// Order lifecycle state machine
pub mod order;
/// Product listings and stock
pub mod product;
/// Profiles, roles and farms
pub mod profile;
/// Stock holds backing orders
pub mod reservation;
/// Reviews of delivered orders
pub mod review;
/// Caller identity
pub mod session;
/// Scheduled cancellation sweeps
pub mod sweep;
