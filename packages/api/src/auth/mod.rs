//! Authentication: provider adapters, account reconciliation, session tokens.

mod config;
pub mod credentials;
pub mod csrf;
mod flow_store;
mod github;
mod google;
pub mod oauth;
mod providers;
pub mod reconcile;
pub mod session;
mod token;

pub use config::{AuthSettings, OAuthConfig};
pub use credentials::Credentials;
pub use csrf::CSRF_COOKIE;
pub use flow_store::FlowStore;
pub use github::GitHubOAuth;
pub use google::GoogleOAuth;
pub use oauth::{AuthorizationRequest, OAuthProfile, PendingAuthorization, PENDING_OAUTH_KEY};
pub use providers::{ProviderInfo, Providers};
pub use session::{session_layer, Session, SessionUser, SESSION_COOKIE};
pub use token::{JwtManager, SessionClaims};
