//! Request guards
//!
//! Three axum middleware functions, installed with
//! `axum::middleware::from_fn_with_state`:
//!
//! - [`login_required`]: passthrough unless `auth.enforce_login_required` is set
//! - [`admin_login_required`]: admin JWT in the `Auth` header, expiry checked
//! - [`cust_login_required`]: customer API token in the `Auth` header
//!
//! Every rejection is a bare 401; the cause only goes to the log.

use super::jwt::AdminJwtError;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

/// Header carrying either the API token or the admin JWT
pub const AUTH_HEADER: &str = "auth";

/// Customer resolved by [`cust_login_required`]
///
/// Handlers behind the customer guard take this as an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCustomer {
    pub customer_id: i64,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthCustomer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthCustomer>().copied().ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "AuthCustomer requested on a route without the customer guard"
            ))
        })
    }
}

// Any valid UTF-8 is accepted; `HeaderValue::to_str` would reject non-ASCII.
fn auth_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}

/// Invoke the handler regardless of the `Auth` header
///
/// With `auth.enforce_login_required` the guard instead requires a known
/// customer token, without touching `updated_on`.
pub async fn login_required(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config().auth.enforce_login_required {
        return Ok(next.run(request).await);
    }

    let token = auth_header(request.headers()).ok_or(ApiError::Unauthorized)?;
    let customer_id = state.resolver().resolve_customer_id(token).await;
    if customer_id <= 0 {
        info!("Login required: customer token rejected");
        return Err(ApiError::Unauthorized);
    }

    request.extensions_mut().insert(AuthCustomer { customer_id });
    Ok(next.run(request).await)
}

/// Accept an admin JWT whose `exp` has not passed
///
/// The signature is only checked when the service was configured with
/// `auth.admin_jwt.verify_signature`.
pub async fn admin_login_required(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = auth_header(request.headers()) else {
        info!("Invalid token. Missing Auth header.");
        return Err(ApiError::Unauthorized);
    };

    match state.admin_jwt().validate(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(AdminJwtError::Expired { exp }) => {
            info!(exp = %exp, "Token expired");
            Err(ApiError::Unauthorized)
        }
        Err(AdminJwtError::Invalid(e)) => {
            info!(error = %e, "Invalid token. Not able to decode.");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Accept a customer API token and stamp the customer as seen
pub async fn cust_login_required(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = auth_header(request.headers()) else {
        info!("Customer token rejected: missing Auth header");
        return Err(ApiError::Unauthorized);
    };

    let customer_id = state.resolver().resolve_customer_id(token).await;

    if state.config().auth.diagnostic_customer_id == Some(customer_id) {
        info!(customer_id, api = token, "browser_login");
    }

    if customer_id <= 0 {
        info!(customer_id, "Customer token rejected");
        return Err(ApiError::Unauthorized);
    }

    if let Err(e) = state.resolver().touch_customer(customer_id).await {
        warn!(customer_id, error = %e, "Failed to update customer last seen");
    }

    request.extensions_mut().insert(AuthCustomer { customer_id });
    Ok(next.run(request).await)
}
