//! # Sign-in check and OAuth account reconciliation
//!
//! Every sign-in passes through [`sign_in`] before a token is issued. Credentials
//! sign-ins pass unchanged: the backend already confirmed the user. OAuth sign-ins go
//! through [`reconcile`], which asks the backend to find or create the account for
//! the provider identity and rewrites the in-flight [`Identity`] with the backend's
//! id and email.
//!
//! Reconciliation fails closed: a missing `user` in the response, a non-2xx status,
//! an undecodable body or a transport error all return `false`. Errors are logged and
//! never propagated.

use crate::backend::{BackendClient, OAuthLinkRequest};
use crate::models::{Identity, Provider};

use super::oauth::OAuthProfile;

/// Decide whether a sign-in may proceed, reconciling OAuth identities first.
pub async fn sign_in(
    backend: &BackendClient,
    provider: Provider,
    profile: Option<&OAuthProfile>,
    identity: &mut Identity,
) -> bool {
    match (provider, profile) {
        (Provider::Credentials, _) => true,
        (provider, Some(profile)) => reconcile(backend, provider, profile, identity).await,
        (provider, None) => {
            tracing::error!("{} sign-in without a provider profile", provider.display_name());
            false
        }
    }
}

/// Link a provider profile to a backend account.
///
/// On success the identity's `id` and `email` (and roles, if the backend sent any)
/// are replaced with the backend's values.
pub async fn reconcile(
    backend: &BackendClient,
    provider: Provider,
    profile: &OAuthProfile,
    identity: &mut Identity,
) -> bool {
    let Some(request) = OAuthLinkRequest::new(provider, profile) else {
        return false;
    };

    match backend.link_oauth(&request).await {
        Ok(Some(linked)) => {
            tracing::debug!(provider = %provider, user_id = %linked.id, "Linked OAuth account");
            identity.apply_link(linked);
            true
        }
        Ok(None) => {
            tracing::warn!(provider = %provider, "Backend did not return a user for OAuth sign-in");
            false
        }
        Err(e) => {
            tracing::error!("Error during {} sign-in: {}", provider.display_name(), e);
            false
        }
    }
}
