// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SLM Agent session service.
//!
//! This crate keeps the mobile client's agent session in sync with the SLM
//! agent API: login, role refresh on read, local profile edits and logout.
//! A small loopback HTTP bridge exposes the same operations to the app shell.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::SessionService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: SessionService,
}
