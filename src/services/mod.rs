// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod agent_api;
pub mod credentials;
pub mod session;

pub use agent_api::AgentApiClient;
pub use credentials::{match_credentials, normalize_phone, CredentialMatch};
pub use session::SessionService;
