use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use classdesk_auth::verify_token;
use classdesk_config::JwtConfig;
use classdesk_core::AppError;

use crate::state::AppState;

/// Who is making the request. Carries no roles or permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolves the caller of a request from its headers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` when the request carries no usable credentials.
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Returns the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Identity from an HS256 bearer token.
#[derive(Debug, Clone)]
pub struct JwtIdentityProvider {
    config: JwtConfig,
}

impl JwtIdentityProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = bearer_token(headers)?;

        let claims = match verify_token(token, &self.config) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err.error, "Rejected bearer token");
                return None;
            }
        };

        let user_id = claims.user_id().ok()?;
        Some(Identity {
            user_id,
            email: claims.email,
        })
    }
}

/// Extractor for routes that need a caller but no particular permission.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = state
            .gate
            .authenticate(&parts.headers)
            .await
            .map_err(AppError::from_domain)?;

        Ok(AuthUser(identity))
    }
}
