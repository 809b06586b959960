// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes called by the mobile shell.

use crate::error::{AppError, Result};
use crate::models::{AuthOutcome, ProfileEdit, User};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session).delete(end_session))
        .route("/session/login", post(login))
        .route("/session/profile", patch(update_profile))
        .route("/session/last-login", get(last_login))
}

// ─── Responses ───────────────────────────────────────────────

/// Session user as exposed to the mobile client.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub id_number: Option<String>,
    pub id_issue_date: Option<String>,
    pub id_issue_place: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown> | null"))]
    pub role: Option<Map<String, Value>>,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub extra: Map<String, Value>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            email: user.email,
            avatar: user.avatar,
            address: user.address,
            birth_date: user.birth_date,
            gender: user.gender,
            id_number: user.id_number,
            id_issue_date: user.id_issue_date,
            id_issue_place: user.id_issue_place,
            role: user.role.map(|role| role.0),
            extra: user.extra,
        }
    }
}

/// Login-form prefill.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct LastLoginResponse {
    pub phone: Option<String>,
    pub name: Option<String>,
}

// ─── Handlers ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    password: String,
}

/// Log in with phone and password.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    match state.session.authenticate(&body.phone, &body.password).await? {
        AuthOutcome::Success(user) => Ok(Json(user.into())),
        AuthOutcome::InvalidPhone => Err(AppError::InvalidPhone),
        AuthOutcome::InvalidPassword => Err(AppError::InvalidPassword),
        AuthOutcome::NetworkError(msg) => Err(AppError::AgentApi(msg)),
    }
}

/// Get the session user with a freshly fetched role.
async fn get_session(State(state): State<Arc<AppState>>) -> Result<Json<UserResponse>> {
    let user = state
        .session
        .refresh_and_get()
        .await?
        .ok_or_else(|| AppError::NotFound("No active session".to_string()))?;

    Ok(Json(user.into()))
}

/// Merge a partial profile edit.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<ProfileEdit>,
) -> Result<Json<UserResponse>> {
    let user = state.session.merge_profile_edit(edit).await?;
    Ok(Json(user.into()))
}

/// Log out.
async fn end_session(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.session.end_session().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn last_login(State(state): State<Arc<AppState>>) -> Result<Json<LastLoginResponse>> {
    Ok(Json(LastLoginResponse {
        phone: state.session.last_phone().await?,
        name: state.session.last_display_name().await?,
    }))
}
