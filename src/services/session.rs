// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and profile synchronization.
//!
//! The locally cached user record is a cache of the agent API, which stays
//! authoritative for the role. Locally edited profile fields the API never
//! returns survive until overwritten.

use crate::config::Config;
use crate::db::LocalStore;
use crate::error::AppError;
use crate::models::{AuthOutcome, ProfileEdit, User};
use crate::services::agent_api::AgentApiClient;
use crate::services::credentials::{mask_phone, match_credentials, normalize_phone, CredentialMatch};
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

/// Session service for one logged-in agent.
///
/// Clones share the same store and the same write lock, so all session
/// mutations within a process are serialized.
#[derive(Clone)]
pub struct SessionService {
    api: AgentApiClient,
    store: LocalStore,
    trace_credential_matches: bool,
    write_lock: Arc<Mutex<()>>,
}

impl SessionService {
    pub fn new(api: AgentApiClient, store: LocalStore) -> Self {
        Self {
            api,
            store,
            trace_credential_matches: false,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build the API client from `config` and attach `store`.
    pub fn from_config(config: &Config, store: LocalStore) -> Result<Self, AppError> {
        let api = AgentApiClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self::new(api, store).with_credential_tracing(config.trace_credential_matches))
    }

    /// Log every credential comparison (masked). Development only.
    pub fn with_credential_tracing(mut self, enabled: bool) -> Self {
        self.trace_credential_matches = enabled;
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    // ─── Login ───────────────────────────────────────────────────────────────

    /// Authenticate an agent by phone and password.
    ///
    /// On success the user record, last-used phone and display name are
    /// persisted. Only local storage faults are returned as `Err`; every
    /// other failure is an [`AuthOutcome`] variant.
    ///
    /// Remote calls run before the write lock is taken, so a slow agent API
    /// never blocks logout.
    pub async fn authenticate(&self, phone: &str, password: &str) -> Result<AuthOutcome, AppError> {
        if normalize_phone(phone).is_empty() {
            return Ok(AuthOutcome::InvalidPhone);
        }
        if password.is_empty() {
            return Ok(AuthOutcome::InvalidPassword);
        }

        let users = match self.api.list_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch agent list for login");
                return Ok(AuthOutcome::NetworkError(e.to_string()));
            }
        };

        let masked = mask_phone(&normalize_phone(phone));
        let remote = match match_credentials(&users, phone, password, self.trace_credential_matches)
        {
            CredentialMatch::Found(remote) => remote.clone(),
            CredentialMatch::WrongPassword => {
                tracing::info!(phone = %masked, "Login rejected: wrong password");
                return Ok(AuthOutcome::InvalidPassword);
            }
            CredentialMatch::NoSuchPhone => {
                tracing::info!(phone = %masked, "Login rejected: unknown phone");
                return Ok(AuthOutcome::InvalidPhone);
            }
        };
        drop(users);

        let mut user = User::from(remote);

        // The listing may omit or carry a stale role; the detail record wins.
        match self.api.get_user_detail(user.id).await {
            Ok(detail) => {
                if let Some(role) = detail.role {
                    user.role = Some(role);
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    error = %e,
                    "Failed to fetch role at login, continuing without refresh"
                );
            }
        }

        let _guard = self.write_lock.lock().await;

        // The last role always belongs to the stored record, even if a
        // write below fails partway.
        self.store.delete_last_role().await?;
        self.store.set_user(&user).await?;
        if let Some(role) = &user.role {
            self.store.set_last_role(role).await?;
        }
        self.store.set_last_phone(phone.trim()).await?;
        self.store.set_last_name(&user.name).await?;

        tracing::info!(user_id = user.id, "Agent logged in, session stored");
        Ok(AuthOutcome::Success(user))
    }

    // ─── Read ────────────────────────────────────────────────────────────────

    /// Return the cached user with the freshest obtainable role.
    ///
    /// The role is re-fetched from the agent API. On failure the last known
    /// role is used, or the cached record is returned as-is. Remote failures
    /// are never returned to the caller.
    pub async fn refresh_and_get(&self) -> Result<Option<User>, AppError> {
        let Some(cached) = self.store.get_user().await? else {
            return Ok(None);
        };

        let fetched = self.api.get_user_detail(cached.id).await;

        // The session may have ended or changed hands during the fetch.
        let _guard = self.write_lock.lock().await;
        let Some(mut user) = self.store.get_user().await? else {
            return Ok(None);
        };
        if user.id != cached.id {
            tracing::debug!(user_id = user.id, "Session changed during role refresh");
            return Ok(Some(user));
        }

        match fetched {
            Ok(detail) => {
                if let Some(role) = detail.role {
                    if user.role.as_ref() != Some(&role) {
                        user.role = Some(role.clone());
                        self.store.set_user(&user).await?;
                        tracing::debug!(user_id = user.id, "Role refreshed");
                    }
                    self.store.set_last_role(&role).await?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    error = %e,
                    "Role refresh failed, using cached role"
                );
                if let Some(role) = self.store.get_last_role().await? {
                    user.role = Some(role);
                }
            }
        }

        Ok(Some(user))
    }

    /// Last phone number used to log in, kept across logout.
    pub async fn last_phone(&self) -> Result<Option<String>, AppError> {
        self.store.get_last_phone().await
    }

    /// Display name of the last agent to log in, kept across logout.
    pub async fn last_display_name(&self) -> Result<Option<String>, AppError> {
        self.store.get_last_name().await
    }

    // ─── Write ───────────────────────────────────────────────────────────────

    /// Merge a partial profile edit into the cached record and persist it.
    pub async fn merge_profile_edit(&self, edit: ProfileEdit) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut user = self.store.get_user().await?.ok_or(AppError::NoSession)?;

        edit.validate()?;

        let name_changed = edit.apply_to(&mut user);
        self.store.set_user(&user).await?;
        if name_changed {
            self.store.set_last_name(&user.name).await?;
        }

        tracing::info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    /// End the session.
    ///
    /// The cached record and role are removed; the last-used phone and name
    /// are kept to prefill the login form.
    pub async fn end_session(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        self.store.delete_last_role().await?;
        self.store.delete_user().await?;

        tracing::info!("Session ended");
        Ok(())
    }
}
