// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User models: the cached session record and the agent API wire shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Keys a profile edit may never set; the agent API owns them.
const REMOTE_CONTROLLED_KEYS: &[&str] = &["id", "phone", "password", "role"];

/// Access descriptor attached to an agent.
///
/// The agent API treats roles as free-form objects, so the payload is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub Map<String, Value>);

impl Role {
    /// Role display name, if the API supplied one.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// Agent record cached in local storage for the active session.
///
/// Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Agent ID assigned by the agent API
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Phone number as stored remotely (login key)
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, alias = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Government ID number
    #[serde(default, alias = "idNumber", skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, alias = "idIssueDate", skip_serializing_if = "Option::is_none")]
    pub id_issue_date: Option<String>,
    #[serde(default, alias = "idIssuePlace", skip_serializing_if = "Option::is_none")]
    pub id_issue_place: Option<String>,
    /// Role, refreshed from the agent API on every read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Any other fields supplied by the API or by local edits
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User record as returned by `GET /users`.
///
/// The agent API ships plaintext passwords in this listing; the password is
/// only ever compared, never cached or logged.
#[derive(Clone, Deserialize)]
pub struct RemoteUser {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "idNumber")]
    pub id_number: Option<String>,
    #[serde(default, alias = "idIssueDate")]
    pub id_issue_date: Option<String>,
    #[serde(default, alias = "idIssuePlace")]
    pub id_issue_place: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for RemoteUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl From<RemoteUser> for User {
    fn from(remote: RemoteUser) -> Self {
        Self {
            id: remote.id,
            name: remote.name,
            phone: remote.phone,
            email: remote.email,
            avatar: remote.avatar,
            address: remote.address,
            birth_date: remote.birth_date,
            gender: remote.gender,
            id_number: remote.id_number,
            id_issue_date: remote.id_issue_date,
            id_issue_place: remote.id_issue_place,
            role: remote.role,
            extra: remote.extra,
        }
    }
}

/// Detail record as returned by `GET /users/{id}`. Only the role is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUserDetail {
    #[serde(default)]
    pub role: Option<Role>,
}

/// Deserialize a field so that an absent key stays `None` (via
/// `#[serde(default)]`) while an explicit `null` becomes `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Partial profile update.
///
/// Absent fields leave the cached value untouched; `null` clears it. The
/// display name can be changed but not cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileEdit {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(email)]
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, alias = "birthDate", deserialize_with = "present")]
    pub birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
    #[serde(default, alias = "idNumber", deserialize_with = "present")]
    pub id_number: Option<Option<String>>,
    #[serde(default, alias = "idIssueDate", deserialize_with = "present")]
    pub id_issue_date: Option<Option<String>>,
    #[serde(default, alias = "idIssuePlace", deserialize_with = "present")]
    pub id_issue_place: Option<Option<String>>,
    /// Fields the agent API does not know about yet
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileEdit {
    /// Shallow-merge this edit into `user`.
    ///
    /// Returns true if the display name changed.
    pub fn apply_to(self, user: &mut User) -> bool {
        fn set(slot: &mut Option<String>, value: Option<Option<String>>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        let name_changed = match self.name {
            Some(name) if name != user.name => {
                user.name = name;
                true
            }
            _ => false,
        };

        set(&mut user.email, self.email);
        set(&mut user.avatar, self.avatar);
        set(&mut user.address, self.address);
        set(&mut user.birth_date, self.birth_date);
        set(&mut user.gender, self.gender);
        set(&mut user.id_number, self.id_number);
        set(&mut user.id_issue_date, self.id_issue_date);
        set(&mut user.id_issue_place, self.id_issue_place);

        for (key, value) in self.extra {
            if REMOTE_CONTROLLED_KEYS.contains(&key.as_str()) {
                tracing::debug!(field = %key, "Ignoring remote-controlled field in profile edit");
                continue;
            }
            user.extra.insert(key, value);
        }

        name_changed
    }
}
