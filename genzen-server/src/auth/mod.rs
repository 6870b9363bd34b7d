//! Bearer-token authentication
//!
//! Requests carry an external-identity-provider token; the server verifies
//! it through the `IdentityVerifier` seam and exchanges it for an internal
//! user record, creating the row on first sight.
//!
//! Uses the custom extractor pattern: handlers take a `CurrentUser`
//! parameter and never see raw tokens.

use crate::api::server::AppContext;
use crate::db;
use crate::error::{Error, Result};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use genzen_common::model::User;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::info;

/// Identity asserted by the external provider after token verification
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Provider-assigned subject id
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Token verification seam
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the identity it asserts
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    sub: Option<String>,
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

/// Verifier calling the provider's tokeninfo endpoint
pub struct HttpIdentityVerifier {
    http_client: reqwest::Client,
    verify_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(verify_url: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            verify_url,
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .http_client
            .get(&self.verify_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| Error::Unauthenticated(format!("token verification failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Unauthenticated("Invalid token".to_string()));
        }

        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::Unauthenticated(format!("invalid tokeninfo response: {}", e)))?;

        let subject = info
            .sub
            .or(info.user_id)
            .ok_or_else(|| Error::Unauthenticated("token carries no subject".to_string()))?;

        Ok(VerifiedIdentity {
            subject,
            email: info.email,
            name: info.name,
        })
    }
}

/// Exchange a verified identity for the internal user, creating the row on
/// first sight
pub async fn resolve_user(
    pool: &SqlitePool,
    provider: &str,
    identity: &VerifiedIdentity,
) -> Result<User> {
    if let Some(user) = db::users::get_user_by_subject(pool, &identity.subject).await? {
        return Ok(user);
    }

    let email = identity
        .email
        .clone()
        .ok_or_else(|| Error::Unauthenticated("token carries no email".to_string()))?;
    let name = identity.name.clone().unwrap_or_else(|| email.clone());

    let created = db::users::create_user(
        pool,
        db::users::NewUser {
            email,
            name,
            auth_provider: provider.to_string(),
            subject_id: identity.subject.clone(),
            preferences: serde_json::json!({}),
        },
    )
    .await;

    match created {
        Ok(user) => {
            info!("Created user {} for subject {}", user.id, identity.subject);
            Ok(user)
        }
        // A concurrent first request may have inserted the row already
        Err(_) => db::users::get_user_by_subject(pool, &identity.subject)
            .await?
            .ok_or_else(|| Error::Internal("user creation raced and lost".to_string())),
    }
}

/// The authenticated caller, extracted from the Authorization header
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Unauthenticated("No token provided".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthenticated("No token provided".to_string()))?;

        let identity = ctx.verifier.verify(token).await?;
        let user = resolve_user(&ctx.db, &ctx.auth_provider, &identity).await?;
        Ok(CurrentUser(user))
    }
}
