//! Admin user directory endpoints.
//!
//! Flow Overview:
//! 1) The access guard has already verified the token and admitted only
//!    `ADMIN`/`SUPER_ADMIN` callers, injecting [`AuthUser`].
//! 2) Handlers parse and validate the request shape.
//! 3) The directory service enforces the per-operation RBAC rules.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::portal::auth::guard::AuthUser;
use crate::portal::error::Error;
use crate::portal::users::{service, Role};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users, newest created first"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Insufficient role"),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(_caller): Extension<AuthUser>,
    pool: Extension<PgPool>,
) -> Response {
    match service::list(&pool).await {
        Ok(users) => (StatusCode::OK, Json(json!({ "users": users }))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid input or duplicate email"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Privileged role requires SUPER_ADMIN"),
    ),
    tag = "users"
)]
pub async fn create_user(
    Extension(caller): Extension<AuthUser>,
    pool: Extension<PgPool>,
    payload: Option<Json<CreateUserRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return Error::Validation("Invalid input data".to_string()).into_response();
    };

    let request = service::CreateUser {
        email: request.email,
        name: request.name,
        password: request.password,
        role: request.role,
    };

    match service::create(&pool, &caller, request).await {
        Ok(user) => (StatusCode::CREATED, Json(json!({ "user": user }))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User detail"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn get_user(
    Path(id): Path<String>,
    Extension(_caller): Extension<AuthUser>,
    pool: Extension<PgPool>,
) -> Response {
    let Some(user_id) = parse_id(&id) else {
        return Error::Validation("Invalid user id".to_string()).into_response();
    };

    match service::get(&pool, user_id).await {
        Ok(user) => (StatusCode::OK, Json(json!({ "user": user }))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Invalid input or duplicate email"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Privileged role requires SUPER_ADMIN"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn update_user(
    Path(id): Path<String>,
    Extension(caller): Extension<AuthUser>,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdateUserRequest>>,
) -> Response {
    let Some(user_id) = parse_id(&id) else {
        return Error::Validation("Invalid user id".to_string()).into_response();
    };

    let Some(Json(request)) = payload else {
        return Error::Validation("Invalid input data".to_string()).into_response();
    };

    let request = service::UpdateUser {
        email: request.email,
        name: request.name,
        password: request.password,
        role: request.role,
    };

    match service::update(&pool, &caller, user_id, request).await {
        Ok(user) => (StatusCode::OK, Json(json!({ "user": user }))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Invalid user id or self-deletion"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Deleting an admin requires SUPER_ADMIN"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    Path(id): Path<String>,
    Extension(caller): Extension<AuthUser>,
    pool: Extension<PgPool>,
) -> Response {
    let Some(user_id) = parse_id(&id) else {
        return Error::Validation("Invalid user id".to_string()).into_response();
    };

    match service::delete(&pool, &caller, user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "User deleted successfully" })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id(&format!("  {id} ")), Some(id));
        assert_eq!(parse_id("42"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let result: Result<UpdateUserRequest, _> =
            serde_json::from_str(r#"{"name": "A", "hashedPassword": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_rejects_unknown_role() {
        let result: Result<CreateUserRequest, _> = serde_json::from_str(
            r#"{"email": "a@b.com", "name": "A", "password": "123456", "role": "ROOT"}"#,
        );
        assert!(result.is_err());
    }
}
