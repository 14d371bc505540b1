//! Guarded routes
//!
//! One small route group per guard. The handlers only echo what the guard
//! resolved, which makes each guard observable over HTTP.

use crate::auth::{
    admin_login_required, cust_login_required, login_required, AdminClaims, AuthCustomer,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Extension, Json, Router};
use serde::Serialize;
use serde_json::Number;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: Number,
}

#[derive(Debug, Serialize)]
pub struct CustomerSession {
    pub customer_id: i64,
}

/// Routes behind `login_required`
pub fn open_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route_layer(from_fn_with_state(state.clone(), login_required))
}

/// Routes behind `admin_login_required`
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/session", get(admin_session))
        .route_layer(from_fn_with_state(state.clone(), admin_login_required))
}

/// Routes behind `cust_login_required`
pub fn customer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/session", get(customer_session))
        .route_layer(from_fn_with_state(state.clone(), cust_login_required))
}

/// GET /api/v1/ping
async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

/// GET /api/v1/admin/session
///
/// # Authentication
/// Requires an unexpired admin JWT in the `Auth` header.
async fn admin_session(claims: Option<Extension<AdminClaims>>) -> ApiResult<Json<AdminSession>> {
    let Extension(claims) = claims.ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!("admin session served without the admin guard"))
    })?;

    Ok(Json(AdminSession {
        sub: claims.sub,
        exp: claims.exp,
    }))
}

/// GET /api/v1/customer/session
///
/// # Authentication
/// Requires a customer API token in the `Auth` header.
async fn customer_session(customer: AuthCustomer) -> ApiResult<Json<CustomerSession>> {
    Ok(Json(CustomerSession {
        customer_id: customer.customer_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_admin_session_echoes_claims() {
        let claims: AdminClaims =
            serde_json::from_value(json!({ "sub": "admin-1", "exp": 1_700_000_060.5 })).unwrap();

        let Json(session) = admin_session(Some(Extension(claims))).await.unwrap();

        assert_eq!(session.sub.as_deref(), Some("admin-1"));
        assert_eq!(session.exp.as_f64(), Some(1_700_000_060.5));
    }

    #[tokio::test]
    async fn test_admin_session_without_guard_is_internal_error() {
        let response = admin_session(None).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
