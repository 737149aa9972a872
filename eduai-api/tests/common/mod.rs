//! Shared helpers for router tests
//!
//! The app runs over the in-memory store, so these tests need no external
//! services. Requests go through the full middleware stack via
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use eduai_api::app::{build_router, AppState};
use eduai_api::config::Config;
use eduai_shared::auth::jwt::{create_token, Claims, TokenType};
use eduai_shared::class_code::{CodeGenerator, FriendlyCodes};
use eduai_shared::classroom::{Classroom, ClassroomConfig};
use eduai_shared::models::user::{CreateUser, User, UserRole};
use eduai_shared::store::{MemoryStore, Store};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "router-test-secret-at-least-32-bytes-long";
pub const SYNC_SECRET: &str = "sync-secret-for-tests";

/// Memory-backed configuration with the sync endpoint enabled
pub fn test_config() -> Config {
    config_with(&[("IDENTITY_SYNC_SECRET", SYNC_SECRET)])
}

pub fn config_with(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("STORAGE_BACKEND", "memory"),
        ("JWT_SECRET", JWT_SECRET),
    ];
    vars.extend_from_slice(extra);

    Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("valid test configuration")
}

/// A running router plus direct access to its store
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

/// A seeded user and their access token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(test_config(), Arc::new(FriendlyCodes))
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Arc::new(FriendlyCodes))
    }

    pub fn with_codes(codes: Arc<dyn CodeGenerator>) -> Self {
        Self::build(test_config(), codes)
    }

    fn build(config: Config, codes: Arc<dyn CodeGenerator>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let classroom = Classroom::new(
            store.clone(),
            codes,
            ClassroomConfig {
                max_code_attempts: config.class_code.max_attempts,
            },
        );

        Self {
            app: build_router(AppState::with_classroom(classroom, config)),
            store,
        }
    }

    /// Creates a user directly in the store and mints an access token
    pub async fn user(&self, name: &str, role: UserRole) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                name: name.to_string(),
                email: format!("{}@school.test", name.to_lowercase()),
                password_hash: None,
                external_id: None,
                avatar_url: None,
                role,
            })
            .await
            .expect("create user");

        let token = create_token(
            &Claims::new(user.id, user.role, TokenType::Access),
            JWT_SECRET,
        )
        .expect("mint token");

        TestUser { user, token }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Sends a JSON request and returns the status and parsed body
    /// (`Value::Null` for an empty body)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.send(request).await;
        read_json(response).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, body)
}
