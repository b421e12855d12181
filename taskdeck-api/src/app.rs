/// Application state and router assembly
///
/// Everything behind `/api` except registration and login runs through the
/// shared authentication middleware, which resolves the bearer token to a
/// live [`AuthContext`](taskdeck_shared::auth::middleware::AuthContext)
/// and rejects tokens whose session version no longer matches the store.

use crate::{
    config::Config,
    middleware::security::SecurityHeadersLayer,
    routes::{auth, health, profile, tasks, users},
};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::create_auth_middleware;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to sign and verify access tokens
    pub fn jwt_secret(&self) -> String {
        self.config.jwt.secret.clone()
    }
}

/// Builds the full application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    // "/bulk" is a static segment, so it wins over ":task_id".
    let protected = Router::new()
        .route("/api/me", get(profile::me))
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id/status", patch(users::update_status))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/bulk", patch(tasks::bulk_update_tasks))
        .route("/api/tasks/:task_id", patch(tasks::update_task))
        .layer(axum::middleware::from_fn(create_auth_middleware(
            state.db.clone(),
            state.jwt_secret(),
        )));

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS layer from the configured origin list
///
/// `"*"` anywhere in the list means permissive; otherwise only the listed
/// origins are allowed. Invalid origin strings are skipped with a warning
/// rather than aborting startup.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if config.api.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
