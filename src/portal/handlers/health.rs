//! Liveness probe. Reports the running build so deploys are verifiable
//! from the outside; no database round-trip.

use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::portal::GIT_COMMIT_HASH;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service name, version and build", content_type = "application/json"),
    ),
    tag = "health"
)]
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&app_header()) {
        headers.insert("X-App", value);
    }

    (headers, body)
}

/// `name:version:shorthash`, the hash truncated to seven characters when a
/// commit is known.
fn app_header() -> String {
    let short_hash = GIT_COMMIT_HASH.get(..7).unwrap_or("");

    format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_header_shape() {
        let header = app_header();
        let mut parts = header.split(':');

        assert_eq!(parts.next(), Some(env!("CARGO_PKG_NAME")));
        assert_eq!(parts.next(), Some(env!("CARGO_PKG_VERSION")));
        assert!(parts.next().is_some_and(|hash| hash.len() <= 7));
        assert_eq!(parts.next(), None);
    }
}
