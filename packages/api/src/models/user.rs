//! # User records as the gateway sees them
//!
//! ## [`BackendUser`]
//!
//! The user payload returned by `POST /auth/login`. Roles arrive as a list of
//! `{name}` grants; only the first one is used for the session (see
//! [`Identity::primary_role`]). [`BackendUser::to_user`] projects it onto the shared
//! [`shared::User`] shape used by the front ends.
//!
//! ## [`LinkedUser`]
//!
//! The `user` object returned by `POST /auth/oauth` after the backend finds or creates
//! the account for a federated identity. It always carries `id` and `email`; `roles`
//! are optional.
//!
//! ## [`Identity`]
//!
//! The in-flight identity for one sign-in attempt. Credentials sign-in builds it from a
//! [`BackendUser`]; OAuth sign-in builds it from the provider profile and then lets the
//! reconciler overwrite `id`/`email` with backend values. It lives only until the
//! session token is issued.

use serde::{Deserialize, Serialize};
use shared::{Role, User};

use crate::auth::OAuthProfile;

/// One role grant in a backend user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub name: Role,
}

/// User record returned by the backend's login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<RoleGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl BackendUser {
    /// Convert to the shared user shape for client consumption.
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.roles.first().map(|r| r.name).unwrap_or_default(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

/// Account confirmed by the backend for a federated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub roles: Option<Vec<RoleGrant>>,
}

/// Identity carried through one sign-in attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub roles: Vec<Role>,
}

impl Identity {
    /// Start from a provider profile; the subject stands in for the id until the
    /// backend confirms the account.
    pub fn from_profile(profile: &OAuthProfile) -> Self {
        Self {
            id: profile.sub.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            image: profile.picture.clone(),
            roles: Vec::new(),
        }
    }

    /// Overwrite id and email (and roles, when present) with backend values.
    pub fn apply_link(&mut self, linked: LinkedUser) {
        self.id = linked.id;
        self.email = linked.email;
        if let Some(roles) = linked.roles {
            self.roles = roles.into_iter().map(|r| r.name).collect();
        }
    }

    /// First role in backend order, or [`Role::User`] when none was granted.
    pub fn primary_role(&self) -> Role {
        self.roles.first().copied().unwrap_or_default()
    }
}

impl From<BackendUser> for Identity {
    fn from(user: BackendUser) -> Self {
        Self {
            id: user.id,
            name: Some(user.name).filter(|n| !n.is_empty()),
            email: user.email,
            image: user.profile_picture,
            roles: user.roles.into_iter().map(|r| r.name).collect(),
        }
    }
}
