use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use self::auth::token::TokenIssuer;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::login,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        handlers::login::UserLogin,
        handlers::login::LoginResponse,
        handlers::login::UserProfile,
        handlers::users::CreateUserRequest,
        handlers::users::UpdateUserRequest,
        users::PublicUser,
        users::Role,
    )),
    tags(
        (name = "auth", description = "Credential verification and session tokens"),
        (name = "users", description = "Role-gated user directory"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;

/// Build the application router.
///
/// The admin routes sit behind the access guard; login and health are
/// public. Process-wide state (pool, token issuer) rides as extensions so
/// the guard and handlers share one configuration.
#[must_use]
pub fn router(pool: PgPool, issuer: Arc<TokenIssuer>) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route_layer(middleware::from_fn(auth::guard::require_admin));

    Router::new()
        .merge(admin_routes)
        .route("/api/verify-password", post(handlers::login))
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(issuer))
                .layer(Extension(pool)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    if let (Some(email), Some(password)) = (&globals.admin_email, &globals.admin_password) {
        users::seed::ensure_super_admin(&pool, email, password)
            .await
            .context("Failed to seed super admin")?;
    }

    let issuer = Arc::new(TokenIssuer::new(&globals.jwt_secret));
    let app = router(pool, issuer);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
