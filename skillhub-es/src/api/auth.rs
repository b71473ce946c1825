//! Authentication middleware for skillhub-es
//!
//! Validates the shared API secret and attaches the authenticated caller
//! identity to the request. A configured secret of 0 disables secret
//! checking entirely.
//!
//! This is applied to protected routes only; the health endpoint does
//! NOT use this middleware.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::services::RequestIdentity;
use crate::AppState;

/// Header carrying the shared API secret
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Header naming the authenticated caller (set by the fronting proxy)
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authentication middleware
///
/// Returns 401 Unauthorized if secret validation fails. On success the
/// request gains a `RequestIdentity` extension consumed by handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    // Special case: secret = 0 disables secret checking
    if state.shared_secret != 0 {
        let provided = request
            .headers()
            .get(API_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        match provided {
            Some(secret) if secret == state.shared_secret => {}
            Some(_) => {
                warn!("API secret mismatch");
                return Err(AuthRejection::InvalidSecret);
            }
            None => return Err(AuthRejection::MissingSecret),
        }
    }

    let caller_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from);

    request
        .extensions_mut()
        .insert(RequestIdentity::new(caller_id));

    // Authentication successful - proceed to handler
    Ok(next.run(request).await)
}

/// Authentication rejection types for HTTP responses
#[derive(Debug)]
pub enum AuthRejection {
    MissingSecret,
    InvalidSecret,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            AuthRejection::MissingSecret => "Missing API secret",
            AuthRejection::InvalidSecret => "Invalid API secret",
        };

        let body = Json(json!({
            "error": message,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
