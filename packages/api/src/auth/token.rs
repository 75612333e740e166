//! Session token issuing and verification (HS256 JWT).

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::Role;

use crate::error::AuthError;
use crate::models::Identity;

/// Claims carried by the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    pub fn id(&self) -> &str {
        &self.sub
    }

    pub fn expires(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, max_age: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Build the claims for a freshly signed-in identity: id, email and the first role.
    pub fn claims_for(&self, identity: &Identity, now: DateTime<Utc>) -> SessionClaims {
        let iat = now.timestamp();
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        SessionClaims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.primary_role(),
            name: identity.name.clone(),
            picture: identity.image.clone(),
            iat,
            exp: iat.saturating_add(max_age),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// Issue a signed token for `identity`.
    pub fn issue(&self, identity: &Identity) -> Result<(String, SessionClaims), AuthError> {
        let claims = self.claims_for(identity, Utc::now());
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
