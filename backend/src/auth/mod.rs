//! Request authentication
//!
//! API token lookups against the token tables, admin JWT expiry checks,
//! and the axum guards built on top of them.

mod jwt;
mod middleware;
mod resolver;
mod store;

pub use jwt::{AdminClaims, AdminJwtError, AdminJwtValidator};
pub use middleware::{
    admin_login_required, cust_login_required, login_required, AuthCustomer, AUTH_HEADER,
};
pub use resolver::{TokenResolver, UNAUTHENTICATED};
pub use store::{AuthStore, PgAuthStore};

#[cfg(test)]
pub(crate) use store::testing;
