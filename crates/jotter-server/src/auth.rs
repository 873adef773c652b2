//! Bearer-token access control middleware.
//!
//! Applied to every route except registration, login/refresh, and the route
//! listing.  On success the resolved [`UserIdentity`] is attached to the
//! request extensions, where handlers pick it up via `Extension<UserIdentity>`.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use jotter_auth::UserIdentity;

use crate::api::AppState;
use crate::error::ApiError;

/// Reject the request unless it carries a valid access token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Authentication("Missing bearer token".to_string()))?;

    let identity: UserIdentity = state.tokens.validate(token)?;

    tracing::debug!(user = %identity.username, "request authenticated");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
}
