//! Authentication extractor
//!
//! Resolves the bearer access token from the Authorization header
//! against the token store.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use keygate_core::User;
use keygate_service::AccessTokenService;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from a bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The account that owns the presented token
    pub user: User,
    /// The presented token secret, kept so logout can revoke exactly
    /// the credential that authenticated this request
    pub access_secret: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        let service = AccessTokenService::new(app_state.service_context());

        // Look up the token; unknown and expired tokens report identically
        let user = service.authenticate(bearer.token()).await.map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            ApiError::from(e)
        })?;

        Ok(AuthUser {
            user,
            access_secret: bearer.token().to_string(),
        })
    }
}
