//! Login endpoint: credential verification and token issuance.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::portal::auth::{self, token::TokenIssuer};
use crate::portal::error::Error;
use crate::portal::users::Role;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserLogin {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub is_valid: bool,
    pub token: String,
    pub user: UserProfile,
}

/// Public profile returned on login; never carries the hash.
#[derive(ToSchema, Serialize, Debug)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[utoipa::path(
    post,
    path = "/api/verify-password",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    issuer: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return Error::Validation("Email and password are required".to_string()).into_response();
    };

    if request.email.trim().is_empty() || request.password.is_empty() {
        return Error::Validation("Email and password are required".to_string()).into_response();
    }

    match auth::login(&pool, &issuer, &request.email, &request.password).await {
        Ok(outcome) => {
            debug!("Login successful for {}", outcome.user.id);

            let response = LoginResponse {
                is_valid: true,
                token: outcome.token,
                user: UserProfile {
                    id: outcome.user.id.to_string(),
                    email: outcome.user.email,
                    name: outcome.user.name,
                    role: outcome.user.role,
                },
            };

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_login_response_wire_shape() {
        let response = LoginResponse {
            is_valid: true,
            token: "jwt".to_string(),
            user: UserProfile {
                id: Uuid::new_v4().to_string(),
                email: "a@b.com".to_string(),
                name: "A".to_string(),
                role: Role::Admin,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["user"]["role"], "ADMIN");
        assert!(json["user"].get("hashedPassword").is_none());
    }
}
