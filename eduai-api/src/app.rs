/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eduai_api::{app::{build_router, AppState}, config::Config};
/// use eduai_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use eduai_shared::classroom::{Classroom, ClassroomConfig};
use eduai_shared::store::Store;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Course membership coordinator (owns the store)
    pub classroom: Classroom,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the coordinator over `store` using the configured code
    /// style and attempt limit
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let codes = Arc::from(config.class_code.style.generator());
        let classroom = Classroom::new(
            store,
            codes,
            ClassroomConfig {
                max_code_attempts: config.class_code.max_attempts,
            },
        );

        Self::with_classroom(classroom, config)
    }

    /// Uses an already-built coordinator
    pub fn with_classroom(classroom: Classroom, config: Config) -> Self {
        Self {
            classroom,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        self.classroom.store()
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                          (public)
/// └── /v1/
///     ├── /auth/{register,login,refresh}   (public)
///     ├── POST /users/sync                 (sync secret)
///     ├── GET  /users/external/:external_id (sync secret)
///     ├── GET  /users/me
///     └── /courses
///         ├── POST /          GET /
///         ├── POST /join
///         ├── GET  /:id
///         ├── POST /:id/people
///         ├── DELETE /:id/people/:user_id
///         └── POST|GET /:id/{announcements,assignments,lectures,chat}
/// ```
///
/// Middleware, outermost first: security headers, CORS, request tracing,
/// then bearer authentication on the protected routes.
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let sync_routes = Router::new()
        .route("/users/sync", post(routes::users::sync))
        .route(
            "/users/external/:external_id",
            get(routes::users::get_by_external_id),
        );

    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route(
            "/courses",
            post(routes::courses::create_course).get(routes::courses::list_courses),
        )
        .route("/courses/join", post(routes::courses::join_course))
        .route("/courses/:id", get(routes::courses::get_course))
        .route("/courses/:id/people", post(routes::people::add_person))
        .route(
            "/courses/:id/people/:user_id",
            delete(routes::people::remove_person),
        )
        .route(
            "/courses/:id/announcements",
            post(routes::content::post_announcement).get(routes::content::list_announcements),
        )
        .route(
            "/courses/:id/assignments",
            post(routes::content::post_assignment).get(routes::content::list_assignments),
        )
        .route(
            "/courses/:id/lectures",
            post(routes::content::post_lecture).get(routes::content::list_lectures),
        )
        .route(
            "/courses/:id/chat",
            post(routes::content::post_chat_message).get(routes::content::list_chat_messages),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(sync_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
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
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(routes::users::SYNC_SECRET_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
