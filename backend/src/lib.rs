//! API Guard Backend Library
//!
//! Request guards for API-token and admin-JWT authentication, exposed for
//! the binary and for integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod state;
