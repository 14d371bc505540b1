//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod tokens;

pub use tokens::{CustomerRepository, TokenRepository, TokenTable};
