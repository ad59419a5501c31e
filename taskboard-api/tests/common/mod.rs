/// Common test utilities for integration tests
///
/// Shared infrastructure for the API tests:
/// - Test database setup (migrated schema)
/// - Seeded user with a known password
/// - Bearer token generation
/// - Request/response helpers
///
/// The tests require a running PostgreSQL instance reachable through
/// `DATABASE_URL`, plus `JWT_SECRET`, like the server itself.
use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::{jwt, password};
use taskboard_shared::models::project::{CreateProject, Project};
use taskboard_shared::models::task::{CreateTask, Task};
use taskboard_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Password used for every seeded test user
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub state: AppState,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and one user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path is relative to this crate's Cargo.toml.
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(TEST_PASSWORD)?,
                role: "member".to_string(),
                avatar_url: None,
            },
        )
        .await?;

        let token = jwt::issue_token(user.uid, &user.role, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state.clone());

        Ok(TestContext {
            db,
            app,
            state,
            config,
            user,
            token,
        })
    }

    /// Returns the authorization header value for the seeded user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Cleans up test data
    ///
    /// Deleting the seeded user cascades to their projects, tasks,
    /// comments, activity entries, and notifications.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE uid = $1")
            .bind(self.user.uid)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Builds a JSON request with the given method, uri, and body
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a request with no body
pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::empty()).unwrap()
}

/// Builds a GET request carrying WebSocket handshake headers
///
/// Enough for the realtime route's extractors to run, so handshake
/// rejections can be asserted without a real socket.
pub fn ws_handshake_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates a project owned by the seeded user
pub async fn create_test_project(ctx: &TestContext) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            title: "Test Project".to_string(),
            description: "Project for integration tests".to_string(),
            due_date: "2025-01-01".to_string(),
            priority: "High".to_string(),
            milestones: None,
            created_by: ctx.user.uid,
        },
    )
    .await?;

    Ok(project)
}

/// Creates a task under a project, in the default `to_do` status
pub async fn create_test_task(ctx: &TestContext, project_uid: Uuid) -> anyhow::Result<Task> {
    let task = Task::create(
        &ctx.db,
        CreateTask {
            project_uid,
            title: "Test Task".to_string(),
            description: None,
            due_date: None,
            priority: None,
            status: None,
            created_by: ctx.user.uid,
        },
    )
    .await?;

    Ok(task)
}
