#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use portfolio_api::config::AppConfig;
use portfolio_api::database::models::admin::SEEDED_PERMISSIONS;
use portfolio_api::database::models::{Admin, AdminRole};
use portfolio_api::database::{self, DocumentStore, MemoryStore, Repository};
use portfolio_api::{app, AppState};

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "root-password";

/// The full router over a fresh in-memory store, driven in-process.
#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        database::ensure_collections(store.as_ref()).await?;
        let state = AppState::new(store, AppConfig::for_tests());
        let router = app(state.clone());
        Ok(Self { state, router })
    }

    /// The router itself, for raw requests the JSON helpers don't cover.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read response body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Store an admin directly and return a token for it.
    pub async fn admin_token(&self) -> Result<String> {
        let hash = self.state.passwords.hash(ADMIN_PASSWORD).await?;
        let admin = Repository::<Admin>::new(self.state.store.clone())
            .insert(Admin::new(
                "Root".to_string(),
                ADMIN_EMAIL.to_string(),
                hash,
                AdminRole::Superadmin,
                SEEDED_PERMISSIONS,
            ))
            .await?;
        Ok(self.state.tokens.issue_admin(admin.id, ADMIN_EMAIL, AdminRole::Superadmin)?)
    }

    /// Register a user through the API and return its token and id.
    pub async fn user_token(&self, email: &str) -> Result<(String, Uuid)> {
        let res = self
            .post(
                "/api/users/register",
                None,
                json!({"name": "Ada", "email": email, "password": "user-password"}),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {}", res.body);
        let token = res.body["token"].as_str().context("token missing")?.to_string();
        let id = res.body["user"]["id"].as_str().context("user id missing")?.parse()?;
        Ok((token, id))
    }
}

pub fn sample_course() -> Value {
    json!({
        "title": "Rust for Services",
        "description": "Building HTTP backends",
        "category": "programming",
        "instructor": "Ferris",
        "duration": "6 weeks",
        "level": "intermediate",
        "topics": ["axum", "tokio"],
        "price": 49.5,
        "image": "https://example.com/rust.png"
    })
}

pub fn sample_work() -> Value {
    json!({
        "title": "Storefront",
        "description": "Headless shop",
        "category": "Full Stack",
        "technologies": ["Rust", "React"],
        "metrics": "2x faster checkout"
    })
}

pub fn sample_contact(email: &str) -> Value {
    json!({"name": "A", "email": email, "phone": "123", "subject": "S", "message": "M"})
}
