// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use carbon_tracker::config::Config;
use carbon_tracker::db::{ActivityQuery, ActivityStore, FirestoreDb, InMemoryStore};
use carbon_tracker::error::AppError;
use carbon_tracker::middleware::auth::create_jwt;
use carbon_tracker::models::Activity;
use carbon_tracker::routes::create_router;
use carbon_tracker::services::{
    StaticFactorProvider, TipsError, TipsProvider, TipsRequest, TipsResponse, TipsService,
};
use carbon_tracker::AppState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Store whose every call fails, as an unreachable database would.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl ActivityStore for FailingStore {
    async fn add_activity(&self, _activity: &Activity) -> Result<String, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn list_activities(
        &self,
        _user_id: &str,
        _query: ActivityQuery,
    ) -> Result<Vec<Activity>, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
}

/// Tips provider returning a fixed answer and recording each request.
#[allow(dead_code)]
pub struct StubTipsProvider {
    pub tips: Vec<String>,
    pub delay: Duration,
    pub requests: Mutex<Vec<TipsRequest>>,
}

#[allow(dead_code)]
impl StubTipsProvider {
    pub fn new(tips: &[&str]) -> Self {
        Self {
            tips: tips.iter().map(|t| t.to_string()).collect(),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn last_summary(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.activity_summary.clone())
    }
}

#[async_trait]
impl TipsProvider for StubTipsProvider {
    async fn suggest(&self, request: TipsRequest) -> Result<TipsResponse, TipsError> {
        self.requests.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(TipsResponse {
            tips: self.tips.clone(),
        })
    }
}

/// Build an app over the given store and tips provider.
#[allow(dead_code)]
pub fn create_test_app_with(
    store: Arc<dyn ActivityStore>,
    provider: Option<Arc<dyn TipsProvider>>,
    ai_timeout: Duration,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let tips_service = TipsService::new(provider, ai_timeout, config.tip_count);

    let state = Arc::new(AppState::new(
        config,
        store,
        Arc::new(StaticFactorProvider::default()),
        tips_service,
    ));

    (create_router(state.clone()), state)
}

/// Create a test app with an empty in-memory store and no AI provider.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(
        Arc::new(InMemoryStore::new()),
        None,
        Duration::from_secs(1),
    )
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, state: &AppState) -> String {
    create_jwt(user_id, &state.config.jwt_signing_key).unwrap()
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
