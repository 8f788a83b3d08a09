#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use reflect_api::auth::{generate_jwt, Claims};
use reflect_api::config::AppConfig;
use reflect_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use reflect_api::policy::Role;
use reflect_api::{app, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// In-process application over a fresh memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app(AppState::new(store.clone(), config.clone()));
        Self { router, store, config }
    }

    pub fn token_for(&self, sub: Uuid, email: Option<&str>, name: Option<&str>) -> String {
        let claims = Claims::new(sub, email.map(str::to_string), name.map(str::to_string), &self.config.security);
        generate_jwt(&claims, &self.config.security).expect("sign token")
    }

    /// First sign-in: provisions the user as a learner.
    pub async fn sign_in(&self, name: &str) -> TestUser {
        let id = Uuid::new_v4();
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let token = self.token_for(id, Some(&email), Some(name));

        let (status, _) = self.get("/profile", Some(&token)).await;
        assert_eq!(status, StatusCode::OK, "sign-in for {} failed", name);
        TestUser { id, email, token }
    }

    /// Sign in, then move the user to `role` directly in the store.
    pub async fn user_with_role(&self, name: &str, role: Role) -> TestUser {
        let user = self.sign_in(name).await;
        self.store.set_user_role(user.id, role).await.expect("set role").expect("user exists");
        user
    }

    pub async fn learner_record_id(&self, user: &TestUser) -> Uuid {
        self.store
            .find_learner_by_user(user.id)
            .await
            .expect("store")
            .expect("learner record")
            .id
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, path, token, Some(body)).await
    }
}

/// Reflection body with content long enough to pass validation.
pub fn reflection_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "content": "This week I led the stand-up for the first time and learned to keep it short. ".repeat(2),
        "week_start": "2025-03-03",
    })
}

/// Migrated store on `TEST_DATABASE_URL` (or `DATABASE_URL`); `None` when neither is set,
/// in which case the calling test returns early.
pub async fn pg_store() -> anyhow::Result<Option<PgStore>> {
    let _ = dotenvy::dotenv();
    let Some(url) = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|u| !u.trim().is_empty())
    else {
        eprintln!("skipping: TEST_DATABASE_URL / DATABASE_URL not set");
        return Ok(None);
    };

    let mut database = AppConfig::development().database;
    database.url = Some(url);
    let pool = DatabaseManager::connect(&database).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgStore::new(pool)))
}
