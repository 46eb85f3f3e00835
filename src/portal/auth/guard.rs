//! Access guard for the admin routes.
//!
//! Pure request-time gate: extract a token (cookie first, then bearer
//! header), verify it cryptographically, require an admin role, and attach
//! the caller identity to the request. No database access happens here;
//! privileges are as of token issuance, bounded by the 24h expiry.

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::token::TokenIssuer;
use crate::portal::error::Error;
use crate::portal::users::Role;

/// Cookie the portal frontend stores the session token under.
pub const SESSION_COOKIE_NAME: &str = "portal_token";

/// Caller identity attached to requests that pass the gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Middleware protecting `/api/users`. Denies with 401 for missing or
/// invalid tokens and 403 for valid tokens below `ADMIN`.
pub async fn require_admin(mut req: Request, next: Next) -> Response {
    let Some(issuer) = req.extensions().get::<Arc<TokenIssuer>>().cloned() else {
        error!("TokenIssuer extension missing; router misconfigured");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let token = extract_token(req.headers());

    match authorize(&issuer, token.as_deref()) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// The gate's decision procedure, separated from axum plumbing.
pub fn authorize(issuer: &TokenIssuer, token: Option<&str>) -> Result<AuthUser, Error> {
    let token = token.ok_or(Error::TokenMissing)?;
    let claims = issuer.verify(token)?;

    if !claims.role.is_privileged() {
        return Err(Error::Forbidden("Insufficient permissions"));
    }

    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| Error::TokenInvalid)?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Cookie takes precedence over the `Authorization` header when both are
/// present.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie_token(headers) {
        return Some(token);
    }
    extract_bearer_token(headers)
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
