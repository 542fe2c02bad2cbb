// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tips generation tests.
//!
//! Covers the Gemini client against a mock server, the timeout fallback and
//! the `/api/tips` endpoint's anti-repetition behavior.

use axum::http::StatusCode;
use carbon_tracker::db::{ActivityStore, InMemoryStore};
use carbon_tracker::models::{Activity, ActivityDetails, TransportMode};
use carbon_tracker::services::tips::{normalize_tip, GENERAL_TIPS_POOL, NO_ACTIVITY_SUMMARY};
use carbon_tracker::services::{
    GeminiTipsClient, TipSource, TipsError, TipsProvider, TipsRequest, TipsService,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{authed_request, create_test_app_with, create_test_jwt, json_body, StubTipsProvider};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

async fn mock_gemini(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> GeminiTipsClient {
    GeminiTipsClient::new(&server.uri(), "gemini-2.0-flash", "test-key".to_string())
}

fn request() -> TipsRequest {
    TipsRequest {
        activity_summary: NO_ACTIVITY_SUMMARY.to_string(),
        randomizer: Some(0.5),
    }
}

fn general_pool_contains(tip: &str) -> bool {
    GENERAL_TIPS_POOL
        .iter()
        .any(|pool| normalize_tip(pool) == normalize_tip(tip))
}

// ═══════════════════════════════════════════════════════════════════════════
// GEMINI CLIENT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_gemini_client_parses_tips() {
    let server = mock_gemini(ResponseTemplate::new(200).set_body_json(gemini_reply(
        r#"{"tips": ["Take the bus twice a week", "Swap one beef meal", "Lower the thermostat"]}"#,
    )))
    .await;

    let response = client(&server).suggest(request()).await.unwrap();
    assert_eq!(
        response.tips,
        vec![
            "Take the bus twice a week",
            "Swap one beef meal",
            "Lower the thermostat"
        ]
    );
}

#[tokio::test]
async fn test_gemini_client_accepts_fenced_reply() {
    let server = mock_gemini(ResponseTemplate::new(200).set_body_json(gemini_reply(
        "```json\n{\"tips\": [\"Cycle to work\"]}\n```",
    )))
    .await;

    let response = client(&server).suggest(request()).await.unwrap();
    assert_eq!(response.tips, vec!["Cycle to work"]);
}

#[tokio::test]
async fn test_gemini_client_maps_http_error() {
    let server = mock_gemini(ResponseTemplate::new(503).set_body_string("overloaded")).await;

    let err = client(&server).suggest(request()).await.unwrap_err();
    assert!(matches!(err, TipsError::Status(503, ref body) if body == "overloaded"));
}

#[tokio::test]
async fn test_gemini_client_rejects_empty_candidates() {
    let server =
        mock_gemini(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] }))).await;

    let err = client(&server).suggest(request()).await.unwrap_err();
    assert!(matches!(err, TipsError::InvalidResponse(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// TIMEOUT AND FALLBACK
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_slow_provider_falls_back_to_general_tips() {
    let server = mock_gemini(
        ResponseTemplate::new(200)
            .set_body_json(gemini_reply(r#"{"tips": ["Too late"]}"#))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let service = TipsService::new(
        Some(Arc::new(client(&server))),
        Duration::from_millis(100),
        3,
    );

    let selection = service.suggest(&[], &[]).await;
    assert_eq!(selection.source, TipSource::General);
    assert_eq!(selection.tips.len(), 3);
    assert!(selection.tips.iter().all(|t| general_pool_contains(t)));
}

#[tokio::test]
async fn test_missing_provider_uses_general_tips() {
    let service = TipsService::new(None, Duration::from_secs(1), 3);

    let selection = service.suggest(&[], &[]).await;
    assert_eq!(selection.source, TipSource::General);
    assert_eq!(selection.tips.len(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// ENDPOINT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_tips_endpoint_personalized() {
    let store = Arc::new(InMemoryStore::new());
    let provider = Arc::new(StubTipsProvider::new(&[
        "Try the train for your commute",
        "Keep meat-free Mondays",
        "Switch off standby devices",
    ]));
    let (app, state) =
        create_test_app_with(store.clone(), Some(provider.clone()), Duration::from_secs(1));
    let token = create_test_jwt("user-1", &state);

    store
        .add_activity(&Activity {
            id: None,
            user_id: "user-1".to_string(),
            date: chrono::Utc::now(),
            co2e: 3.4,
            details: ActivityDetails::Transport {
                mode: TransportMode::Car,
                distance: 20.0,
            },
        })
        .await
        .unwrap();

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/tips",
            &token,
            Some(json!({ "previousTips": [] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fromFallback"], false);
    assert!(body.get("notice").is_none());
    assert_eq!(body["tips"][0], "Try the train for your commute");

    let summary = provider.last_summary().unwrap();
    assert_eq!(
        summary,
        "User's recent activities:\n- Transport: Traveled 20 km by car. CO2e: 3.40 kg."
    );
}

#[tokio::test]
async fn test_tips_endpoint_fallback_notice() {
    let (app, state) = create_test_app_with(
        Arc::new(InMemoryStore::new()),
        None,
        Duration::from_secs(1),
    );
    let token = create_test_jwt("user-1", &state);

    let response = app
        .oneshot(authed_request("POST", "/api/tips", &token, Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["fromFallback"], true);
    assert_eq!(body["notice"], "Using general suggestions");
    assert_eq!(body["tips"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_repeated_ai_output_is_changed() {
    let repeated = [
        "Take the bus twice a week",
        "Swap one beef meal",
        "Lower the thermostat",
    ];
    let provider = Arc::new(StubTipsProvider::new(&repeated));
    let (app, state) = create_test_app_with(
        Arc::new(InMemoryStore::new()),
        Some(provider),
        Duration::from_secs(1),
    );
    let token = create_test_jwt("user-1", &state);

    // Same content as shown last time, differing only in case and punctuation
    let previous = json!({
        "previousTips": ["take the bus twice a week.", "Swap one beef meal!", "LOWER THE THERMOSTAT"]
    });

    let response = app
        .oneshot(authed_request("POST", "/api/tips", &token, Some(previous)))
        .await
        .unwrap();

    let body = json_body(response).await;
    let tips: Vec<String> = body["tips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().to_string())
        .collect();

    assert_eq!(body["fromFallback"], false);
    assert_eq!(tips.len(), 3);
    assert_ne!(
        tips.iter().map(|t| normalize_tip(t)).collect::<Vec<_>>(),
        repeated.iter().map(|t| normalize_tip(t)).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_slow_stub_provider_times_out_through_endpoint() {
    let provider =
        Arc::new(StubTipsProvider::new(&["Never shown"]).delayed(Duration::from_secs(5)));
    let (app, state) = create_test_app_with(
        Arc::new(InMemoryStore::new()),
        Some(provider),
        Duration::from_millis(50),
    );
    let token = create_test_jwt("user-1", &state);

    let response = app
        .oneshot(authed_request("POST", "/api/tips", &token, None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["fromFallback"], true);
    assert!(body["tips"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| general_pool_contains(t.as_str().unwrap())));
}
