/// REST client
///
/// Typed wrapper over the Taskboard REST surface. The client holds the
/// bearer token after `login` (or `register`) and attaches it to every
/// subsequent call. Error bodies of the form `{"error": "..."}` are
/// surfaced as [`ClientError::Api`] with their status code.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::api::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = ApiClient::new("http://127.0.0.1:1337");
/// let session = client.login("alice@example.com", "hunter2hunter2").await?;
/// println!("Logged in as {}", session.uid);
///
/// let projects = client.list_projects().await?;
/// println!("{} projects", projects.len());
/// # Ok(())
/// # }
/// ```
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use taskboard_shared::models::{
    comment::Comment, notification::Notification, project::Project, task::Task,
    team_member::TeamMember, user::User,
};

/// Error type for REST calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: StatusCode,
        /// Server-provided message
        message: String,
    },

    /// A call that needs a token was made before login
    #[error("Not authenticated; call login first")]
    NotAuthenticated,
}

/// Registration input
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,

    /// Role string
    pub role: String,

    /// Optional avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Registration response: the created row plus a fresh token
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    /// Created user
    #[serde(flatten)]
    pub user: User,

    /// Bearer token for the new user
    pub token: String,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Bearer token (24 hour expiry)
    pub token: String,

    /// Authenticated user id
    pub uid: Uuid,

    /// Role string
    pub role: String,
}

/// Taskboard REST client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for a server base URL, e.g. `http://127.0.0.1:1337`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// The current bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Overrides the bearer token (for tokens obtained elsewhere)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Registers a new user and keeps the returned token
    pub async fn register(&mut self, input: RegisterUser) -> Result<RegisteredUser, ClientError> {
        let registered: RegisteredUser = self
            .request(Method::POST, "/api/users", Some(serde_json::to_value(&input).unwrap_or_default()), false)
            .await?;

        self.token = Some(registered.token.clone());

        Ok(registered)
    }

    /// Logs in and keeps the returned token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session: Session = self
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                false,
            )
            .await?;

        self.token = Some(session.token.clone());

        Ok(session)
    }

    /// Updates the caller's own profile
    pub async fn update_profile(
        &self,
        user_uid: Uuid,
        name: Option<&str>,
        avatar_url: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, ClientError> {
        self.request(
            Method::PUT,
            &format!("/api/users/{}", user_uid),
            Some(json!({ "name": name, "avatar_url": avatar_url, "password": password })),
            true,
        )
        .await
    }

    /// Creates a project
    pub async fn create_project(
        &self,
        title: &str,
        description: &str,
        due_date: &str,
        priority: &str,
        milestones: Option<JsonValue>,
    ) -> Result<Project, ClientError> {
        self.request(
            Method::POST,
            "/api/projects",
            Some(json!({
                "title": title,
                "description": description,
                "due_date": due_date,
                "priority": priority,
                "milestones": milestones,
            })),
            true,
        )
        .await
    }

    /// Lists projects, newest first
    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.request(Method::GET, "/api/projects", None, true).await
    }

    /// Fetches one project
    pub async fn get_project(&self, project_uid: Uuid) -> Result<Project, ClientError> {
        self.request(
            Method::GET,
            &format!("/api/projects/{}", project_uid),
            None,
            true,
        )
        .await
    }

    /// Lists a project's tasks, newest first
    pub async fn list_project_tasks(&self, project_uid: Uuid) -> Result<Vec<Task>, ClientError> {
        self.request(
            Method::GET,
            &format!("/api/projects/{}/tasks", project_uid),
            None,
            true,
        )
        .await
    }

    /// Creates a task under a project
    pub async fn create_task(
        &self,
        project_uid: Uuid,
        title: &str,
        status: Option<&str>,
    ) -> Result<Task, ClientError> {
        self.request(
            Method::POST,
            "/api/tasks",
            Some(json!({
                "project_uid": project_uid,
                "title": title,
                "status": status,
            })),
            true,
        )
        .await
    }

    /// Moves a task to a new status
    pub async fn update_task_status(
        &self,
        task_uid: Uuid,
        status: &str,
    ) -> Result<Task, ClientError> {
        self.request(
            Method::PATCH,
            &format!("/api/tasks/{}/status", task_uid),
            Some(json!({ "status": status })),
            true,
        )
        .await
    }

    /// Comments on a task
    pub async fn add_comment(
        &self,
        task_uid: Uuid,
        content: &str,
        mentions: Option<Vec<Uuid>>,
    ) -> Result<Comment, ClientError> {
        self.request(
            Method::POST,
            &format!("/api/tasks/{}/comments", task_uid),
            Some(json!({ "content": content, "mentions": mentions })),
            true,
        )
        .await
    }

    /// Lists a task's comments, newest first
    pub async fn list_comments(&self, task_uid: Uuid) -> Result<Vec<Comment>, ClientError> {
        self.request(
            Method::GET,
            &format!("/api/tasks/{}/comments", task_uid),
            None,
            true,
        )
        .await
    }

    /// Lists the caller's notifications, newest first
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.request(Method::GET, "/api/notifications", None, true)
            .await
    }

    /// Marks a notification as read
    pub async fn mark_notification_read(
        &self,
        notification_uid: Uuid,
    ) -> Result<Notification, ClientError> {
        self.request(
            Method::PATCH,
            &format!("/api/notifications/{}/read", notification_uid),
            None,
            true,
        )
        .await
    }

    /// Lists the team roster
    pub async fn list_team_members(&self) -> Result<Vec<TeamMember>, ClientError> {
        self.request(Method::GET, "/api/team/members", None, true)
            .await
    }

    /// Adds a team member
    pub async fn add_team_member(
        &self,
        name: &str,
        role: &str,
        avatar_url: Option<&str>,
    ) -> Result<TeamMember, ClientError> {
        self.request(
            Method::POST,
            "/api/team/members",
            Some(json!({ "name": name, "role": role, "avatar_url": avatar_url })),
            true,
        )
        .await
    }

    /// Updates a team member
    pub async fn update_team_member(
        &self,
        member_uid: Uuid,
        name: Option<&str>,
        role: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<TeamMember, ClientError> {
        self.request(
            Method::PUT,
            &format!("/api/team/members/{}", member_uid),
            Some(json!({ "name": name, "role": role, "avatar_url": avatar_url })),
            true,
        )
        .await
    }

    /// Removes a team member
    pub async fn remove_team_member(&self, member_uid: Uuid) -> Result<(), ClientError> {
        let url = format!("{}/api/team/members/{}", self.base_url, member_uid);
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;

        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Performs one request and decodes the JSON response
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
        authenticated: bool,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(method, &url);

        if authenticated {
            let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Extracts the `{"error": ...}` message from a failed response
    async fn api_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = response
            .json::<JsonValue>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| "Unknown error".to_string());

        ClientError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:1337/");
        assert_eq!(client.base_url, "http://localhost:1337");
    }

    #[test]
    fn test_unauthenticated_calls_need_login() {
        let client = ApiClient::new("http://localhost:1337");
        assert!(client.token().is_none());

        let err = tokio_test_block_on(client.list_projects()).unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[test]
    fn test_set_token() {
        let mut client = ApiClient::new("http://localhost:1337");
        client.set_token("abc");
        assert_eq!(client.token(), Some("abc"));
    }

    // Minimal current-thread executor for the one async assertion above.
    fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }
}
