/// Application state and router builder
///
/// # Router Layout
///
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// └── /api/
///     ├── POST /users                          # Register (public)
///     ├── POST /auth/login                     # Login (public)
///     ├── GET  /realtime?token=...             # Realtime channel (token in query)
///     ├── PUT  /users/:user_uid                # Profile update
///     ├── POST /projects  GET /projects
///     ├── GET  /projects/:project_uid[/tasks]
///     ├── POST /tasks
///     ├── PATCH /tasks/:task_uid/status
///     ├── POST /tasks/:task_uid/comments  GET ...
///     ├── GET  /notifications
///     ├── PATCH /notifications/:notification_uid/read
///     └── /team/members CRUD
/// ```
///
/// # Middleware Stack
///
/// Applied in order: request tracing (tower-http `TraceLayer`), CORS
/// (tower-http `CorsLayer`), then bearer-token authentication on every
/// route below `/api` except registration, login, and the realtime
/// handshake (which authenticates its own query parameter).
use crate::{broadcast::Broadcaster, config::Config};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::middleware::authenticate_headers;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; all
/// fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Realtime event fan-out, injected here so handlers and tests share
    /// the same publish point
    pub events: Broadcaster,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            events: Broadcaster::default(),
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: health, registration, login, and the realtime
    // handshake (token arrives as a query parameter there).
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/users", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/realtime", get(routes::realtime::realtime));

    // Everything else requires a bearer token.
    let authed_routes = Router::new()
        .route("/api/users/:user_uid", put(routes::users::update_profile))
        .route(
            "/api/projects",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/api/projects/:project_uid",
            get(routes::projects::get_project),
        )
        .route(
            "/api/projects/:project_uid/tasks",
            get(routes::projects::list_project_tasks),
        )
        .route("/api/tasks", post(routes::tasks::create_task))
        .route(
            "/api/tasks/:task_uid/status",
            patch(routes::tasks::update_task_status),
        )
        .route(
            "/api/tasks/:task_uid/comments",
            post(routes::tasks::add_comment).get(routes::tasks::list_comments),
        )
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/:notification_uid/read",
            patch(routes::notifications::mark_notification_read),
        )
        .route(
            "/api/team/members",
            get(routes::team::list_members).post(routes::team::add_member),
        )
        .route(
            "/api/team/members/:member_uid",
            put(routes::team::update_member).delete(routes::team::remove_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Configure CORS based on environment.
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer token authentication middleware layer
///
/// Validates the `Authorization: Bearer <token>` header and injects
/// [`AuthUser`](taskboard_shared::auth::middleware::AuthUser) into
/// request extensions. A missing header rejects with 401, a rejected
/// token with 403.
async fn bearer_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let user = authenticate_headers(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
