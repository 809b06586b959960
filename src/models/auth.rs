// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication outcome.

use crate::models::User;

/// Result of a login attempt.
///
/// Each failure cause is reported separately so the login form can say
/// which field is wrong.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials matched; the session record has been persisted.
    Success(User),
    /// No agent is registered with the given phone number.
    InvalidPhone,
    /// An agent has this phone number but the password did not match.
    InvalidPassword,
    /// The agent list could not be fetched.
    NetworkError(String),
}

impl AuthOutcome {
    /// The authenticated user, if the attempt succeeded.
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthOutcome::Success(user) => Some(user),
            _ => None,
        }
    }
}
