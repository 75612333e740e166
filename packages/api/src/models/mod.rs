//! Data models for the auth gateway.

mod provider;
mod user;

pub use provider::Provider;
pub use user::{BackendUser, Identity, LinkedUser, RoleGrant};
