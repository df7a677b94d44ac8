/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use usermanagement_api::{app::{build_router, AppState}, config::Config};
/// use usermanagement_shared::db::pool::create_pool;
/// use usermanagement_shared::store::Stores;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Stores::postgres(pool), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use usermanagement_shared::store::Stores;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(stores: Stores, config: Config) -> Self {
        Self {
            stores,
            config: Arc::new(config),
        }
    }
}

/// Builds the Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/v1/
///     ├── /users
///     │   ├── POST   /                 create
///     │   ├── GET    /?page&perPage    list
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   └── PUT    /:id/password
///     └── /groups
///         ├── POST   /                 create
///         ├── GET    /?page&perPage    list
///         ├── GET    /:id
///         ├── PUT    /:id
///         ├── DELETE /:id
///         ├── GET    /:id/users        members
///         ├── POST   /:id/users        add member
///         └── DELETE /:id/users/:user_id
/// ```
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/:id/password", axum::routing::put(routes::users::change_password));

    let group_routes = Router::new()
        .route(
            "/",
            get(routes::groups::list_groups).post(routes::groups::create_group),
        )
        .route(
            "/:id",
            get(routes::groups::get_group)
                .put(routes::groups::update_group)
                .delete(routes::groups::delete_group),
        )
        .route(
            "/:id/users",
            get(routes::groups::list_members).post(routes::groups::add_member),
        )
        .route("/:id/users/:user_id", delete(routes::groups::remove_member));

    let v1_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/groups", group_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
