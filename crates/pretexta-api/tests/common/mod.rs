//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use pretexta_api::auth::{Credentials, SessionStore};
use pretexta_api::routes;
use pretexta_api::settings::SettingsStore;
use pretexta_api::state::AppState;
use pretexta_content::quiz::Quiz;
use pretexta_content::scenario::Scenario;
use pretexta_content::store::InMemoryContentStore;
use pretexta_llm::config::{LlmConfigStore, ProviderConfig};
use pretexta_test_support::{CannedLlmClient, FixedClock, InMemoryEventRepository};

/// Fixed timestamp used across all integration tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Builds a fully in-memory `AppState` with one enabled `groq` provider and
/// the given canned LLM replies. Credentials are `admin` / `hunter2`.
pub fn test_state(llm_replies: Vec<String>) -> AppState {
    let llm_config = LlmConfigStore::new();
    llm_config.save(provider_config("groq", "sk-test"), fixed_now());

    AppState {
        clock: Arc::new(FixedClock(fixed_now())),
        event_repository: Arc::new(InMemoryEventRepository::new()),
        content: Arc::new(InMemoryContentStore::new()),
        llm_config: Arc::new(llm_config),
        llm_client: Arc::new(CannedLlmClient::new(llm_replies)),
        settings: Arc::new(SettingsStore::new()),
        sessions: Arc::new(SessionStore::new()),
        credentials: Arc::new(Credentials::new("admin", "hunter2")),
    }
}

/// A provider config with the given name and key.
pub fn provider_config(provider: &str, api_key: &str) -> ProviderConfig {
    ProviderConfig {
        provider: provider.to_owned(),
        api_key: api_key.to_owned(),
        api_url: None,
        model_name: None,
        enabled: true,
        rate_limit: 60,
        updated_at: None,
    }
}

/// Builds the app router over a clone of the state. The same state can back
/// many one-shot requests.
pub fn app(state: &AppState) -> Router {
    routes::app_router(state.clone())
}

/// Issues a bearer token directly, bypassing the login route.
pub fn issue_token(state: &AppState) -> String {
    state.sessions.issue("admin")
}

/// A four-node scenario: start message, one question with a risky and a safe
/// option, and two end nodes.
pub fn sample_scenario(id: Uuid) -> Scenario {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": "CEO wire transfer",
        "description": "Business email compromise over chat.",
        "difficulty": "hard",
        "cialdini_categories": ["authority", "urgency"],
        "estimated_time": 12,
        "nodes": [
            {
                "type": "message",
                "id": "start",
                "content_en": { "from": "ceo@corp.example", "body": "Need a favor ASAP." },
                "channel": "chat_ui",
                "next": "q1"
            },
            {
                "type": "question",
                "id": "q1",
                "content_en": { "text": "How do you respond?" },
                "options": [
                    { "text": "Wire the money", "score_impact": -40, "next": "fail" },
                    { "text": "Verify out of band", "score_impact": 15, "next": "win" }
                ]
            },
            {
                "type": "end",
                "id": "fail",
                "result": "failure",
                "content_en": { "title": "Funds lost", "explanation": "Urgency won." }
            },
            {
                "type": "end",
                "id": "win",
                "result": "success",
                "content_en": { "title": "Blocked", "explanation": "Verification works." }
            }
        ]
    }))
    .unwrap()
}

/// A three-question quiz where option 1 is always the correct one.
pub fn sample_quiz(id: Uuid) -> Quiz {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": "Vishing basics",
        "description": "Phone-based pretexts.",
        "difficulty": "easy",
        "cialdini_categories": ["authority"],
        "questions": [
            {
                "id": "q1",
                "content_en": { "text": "IT calls asking for your password." },
                "options": [
                    { "text": "Give it", "correct": false },
                    { "text": "Refuse and report", "correct": true }
                ]
            },
            {
                "id": "q2",
                "content_en": { "text": "An unknown number claims to be your bank." },
                "options": [
                    { "text": "Answer their security questions", "correct": false },
                    { "text": "Hang up and call the number on your card", "correct": true }
                ]
            },
            {
                "id": "q3",
                "content_en": { "text": "A caller cites your manager by name." },
                "options": [
                    { "text": "Trust them, they know internals", "correct": false },
                    { "text": "Verify with the manager directly", "correct": true }
                ]
            }
        ]
    }))
    .unwrap()
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send an authenticated GET request.
pub async fn get_json(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(token), None).await
}

/// Send an unauthenticated GET request.
pub async fn get_json_anon(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None, None).await
}

/// Send an authenticated POST request with a JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

/// Send an unauthenticated POST request with a JSON body.
pub async fn post_json_anon(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, None, Some(body)).await
}

/// Send an authenticated PUT request with a JSON body.
pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

/// Send an authenticated DELETE request.
pub async fn delete_json(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Send an authenticated POST with a raw (non-JSON) body.
pub async fn post_raw(
    app: Router,
    uri: &str,
    token: &str,
    body: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/yaml")
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}
