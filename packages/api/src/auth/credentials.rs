//! Email + password sign-in, checked by the backend.

use std::fmt;

use serde::Deserialize;

use crate::backend::BackendClient;
use crate::models::BackendUser;

/// Submitted sign-in form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Forward credentials to the backend.
///
/// Returns the user on success and `None` for every kind of failure; the reason is
/// only logged.
pub async fn authorize(backend: &BackendClient, credentials: &Credentials) -> Option<BackendUser> {
    match backend.login(&credentials.email, &credentials.password).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            tracing::warn!(email = %credentials.email, "Backend returned no user for credentials");
            None
        }
        Err(e) => {
            tracing::warn!(email = %credentials.email, "Credentials sign-in failed: {}", e);
            None
        }
    }
}
