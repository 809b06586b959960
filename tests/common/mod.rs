// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use slm_agent_session::config::Config;
use slm_agent_session::db::LocalStore;
use slm_agent_session::routes::create_router;
use slm_agent_session::services::{AgentApiClient, SessionService};
use slm_agent_session::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Address nothing listens on (discard port on loopback).
#[allow(dead_code)]
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// In-process stand-in for the SLM agent API.
#[allow(dead_code)]
pub struct FakeAgentApi {
    pub base_url: String,
    pub state: Arc<FakeApiState>,
}

#[derive(Default)]
pub struct FakeApiState {
    pub users: Mutex<Vec<Value>>,
    pub roles: Mutex<HashMap<u64, Value>>,
    pub list_fails: AtomicBool,
    pub detail_fails: AtomicBool,
    pub detail_calls: AtomicUsize,
    pub detail_delay_ms: AtomicU64,
}

#[allow(dead_code)]
impl FakeAgentApi {
    pub fn set_role(&self, user_id: u64, role: Value) {
        self.state.roles.lock().unwrap().insert(user_id, role);
    }

    pub fn fail_detail(&self, fail: bool) {
        self.state.detail_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.list_fails.store(fail, Ordering::SeqCst);
    }

    /// Make every detail request take `delay` before answering.
    pub fn delay_detail(&self, delay: Duration) {
        self.state
            .detail_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn detail_calls(&self) -> usize {
        self.state.detail_calls.load(Ordering::SeqCst)
    }
}

async fn list_users(State(state): State<Arc<FakeApiState>>) -> Result<Json<Value>, StatusCode> {
    if state.list_fails.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let users = state.users.lock().unwrap().clone();
    Ok(Json(Value::Array(users)))
}

async fn user_detail(
    State(state): State<Arc<FakeApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    state.detail_calls.fetch_add(1, Ordering::SeqCst);
    let delay_ms = state.detail_delay_ms.load(Ordering::SeqCst);
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    if state.detail_fails.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let mut user = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u["id"] == json!(id))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    if let Some(role) = state.roles.lock().unwrap().get(&id) {
        user["role"] = role.clone();
    }
    Ok(Json(user))
}

/// Agent accounts served by the fake API by default.
pub fn sample_agents() -> Value {
    json!([
        {
            "id": 1,
            "name": "Tran Thi B",
            "phone": "0912 345 678",
            "password": "pw1",
            "email": "b@slm.vn"
        },
        {
            "id": 7,
            "name": "Nguyen Van A",
            "phone": "0977879291",
            "password": "abc123",
            "sector": "SolarMax"
        }
    ])
}

/// Start a fake agent API on an ephemeral loopback port.
pub async fn spawn_agent_api(users: Value) -> FakeAgentApi {
    let state = Arc::new(FakeApiState::default());
    *state.users.lock().unwrap() = users.as_array().cloned().unwrap_or_default();
    state.roles.lock().unwrap().insert(7, json!({"id": 2, "name": "agent"}));
    state.roles.lock().unwrap().insert(1, json!({"id": 1, "name": "admin"}));

    let app = Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(user_detail))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake agent API");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeAgentApi {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// Session service against `base_url` with an in-memory store.
#[allow(dead_code)]
pub fn session_service(base_url: &str) -> SessionService {
    session_service_with_store(base_url, LocalStore::new_memory())
}

#[allow(dead_code)]
pub fn session_service_with_store(base_url: &str, store: LocalStore) -> SessionService {
    let api = AgentApiClient::new(base_url, Duration::from_secs(2)).unwrap();
    SessionService::new(api, store)
}

/// Create a test app backed by the given agent API and an in-memory store.
#[allow(dead_code)]
pub fn create_test_app(base_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        api_base_url: base_url.to_string(),
        ..Config::test_default()
    };
    let session = SessionService::from_config(&config, LocalStore::new_memory()).unwrap();

    let state = Arc::new(AppState { config, session });

    (create_router(state.clone()), state)
}
