/// Common test utilities for integration tests
///
/// Provides a [`TestContext`] that connects to the test database, runs
/// migrations, and builds the full application router, plus helpers for
/// driving the API through tower without a live listener.
///
/// Each context gets a unique run id; every account registered through the
/// helpers carries it as a username suffix, so parallel test runs never
/// collide and cleanup can delete exactly what a test created.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    run_id: String,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path is relative to Cargo.toml, not this file.
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            run_id: Uuid::new_v4().simple().to_string(),
        })
    }

    /// Returns a username unique to this context
    pub fn username(&self, name: &str) -> String {
        format!("{name}-{}", self.run_id)
    }

    /// Sends a request to the app and returns status plus parsed JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Registers an account through the API; panics on anything but 201
    pub async fn register(&self, name: &str, password: &str, role: Option<&str>) {
        let mut body = json!({
            "username": self.username(name),
            "password": password,
        });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let (status, response) = self
            .request("POST", "/api/auth/register", None, Some(body))
            .await;
        assert_eq!(
            status,
            StatusCode::CREATED,
            "registration of {name} failed: {response}"
        );
    }

    /// Logs in through the API, returning the token and the user profile
    pub async fn login(&self, name: &str, password: &str) -> (String, Value) {
        let body = json!({
            "username": self.username(name),
            "password": password,
        });

        let (status, response) = self.request("POST", "/api/auth/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "login of {name} failed: {response}");

        let token = response["token"].as_str().unwrap().to_string();
        (token, response["user"].clone())
    }

    /// Registers and logs in, returning token and user id
    pub async fn signup(&self, name: &str, password: &str, role: Option<&str>) -> (String, Uuid) {
        self.register(name, password, role).await;
        let (token, user) = self.login(name, password).await;
        let id = user["id"].as_str().unwrap().parse().unwrap();
        (token, id)
    }

    /// Deletes every account this context registered, tasks first
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let pattern = format!("%-{}", self.run_id);

        sqlx::query(
            "DELETE FROM tasks WHERE assigned_to IN (SELECT id FROM users WHERE username LIKE $1)",
        )
        .bind(&pattern)
        .execute(&self.db)
        .await?;

        sqlx::query("DELETE FROM users WHERE username LIKE $1")
            .bind(&pattern)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Helper to create a task through the API as the given token's user
pub async fn create_task(ctx: &TestContext, token: &str, title: &str, assigned_to: Option<Uuid>) -> Value {
    let mut body = json!({
        "title": title,
        "description": format!("{title} description"),
    });
    if let Some(assignee) = assigned_to {
        body["assignedTo"] = json!(assignee.to_string());
    }

    let (status, task) = ctx
        .request("POST", "/api/tasks", Some(token), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "task creation failed: {task}");
    task
}
