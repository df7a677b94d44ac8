/// Common test utilities for the API integration tests
///
/// Each `TestContext` owns a router over a fresh in-memory database, so tests
/// are independent and need no running services.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use usermanagement_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig},
};
use usermanagement_shared::{repository::memory::MemoryDatabase, store::Stores};

pub struct TestContext {
    pub app: Router,
    pub db: MemoryDatabase,
}

impl TestContext {
    pub fn new() -> Self {
        let (stores, db) = Stores::in_memory();
        let app = build_router(AppState::new(stores, test_config()));
        Self { app, db }
    }

    /// Sends a request and returns the status and JSON body (`Null` if empty)
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(json) => self.send_raw(method, uri, &json.to_string()).await,
            None => self.dispatch(Request::builder().method(method).uri(uri), Body::empty()).await,
        }
    }

    /// Sends `body` verbatim as `application/json`
    pub async fn send_raw(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        self.dispatch(builder, Body::from(body.to_string())).await
    }

    async fn dispatch(&self, builder: axum::http::request::Builder, body: Body) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

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

    /// Creates a user through the API and returns its id
    #[allow(dead_code)]
    pub async fn create_user(&self, name: &str, email: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/users",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "secret123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    #[allow(dead_code)]
    pub async fn create_group(&self, name: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/groups",
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create group failed: {}", body);
        body["id"].as_i64().unwrap()
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            run_migrations: false,
        },
    }
}
