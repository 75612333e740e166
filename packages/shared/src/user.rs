//! # Users and application roles
//!
//! [`User`] is the record the backend owns; the gateway and the front ends only read
//! and cache it. [`Role`] is the closed set of application-wide roles, serialised as
//! the backend's `ROLE_*` strings. [`UserStore`] is the client-side cache of the
//! signed-in user together with the session expiry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Application-wide role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_RECRUITER")]
    Recruiter,
    #[serde(rename = "ROLE_CANDIDATE")]
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
            Role::Recruiter => "ROLE_RECRUITER",
            Role::Candidate => "ROLE_CANDIDATE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is not one of the `ROLE_*` names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            "ROLE_RECRUITER" => Ok(Role::Recruiter),
            "ROLE_CANDIDATE" => Ok(Role::Candidate),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user as seen by the front ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    /// Get display name, falling back to email if name is empty.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Client cache of the signed-in user.
///
/// `expires_at` is epoch milliseconds, mirroring the session's `expires` field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStore {
    pub user: Option<User>,
    pub expires_at: Option<i64>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub fn set_expiration(&mut self, expires_at: Option<i64>) {
        self.expires_at = expires_at;
    }

    pub fn clear_user(&mut self) {
        self.user = None;
        self.expires_at = None;
    }

    /// A store without an expiry never expires on its own.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now_millis)
    }

    /// The cached user, unless the cache has expired.
    pub fn current(&self, now_millis: i64) -> Option<&User> {
        if self.is_expired(now_millis) {
            None
        } else {
            self.user.as_ref()
        }
    }
}
