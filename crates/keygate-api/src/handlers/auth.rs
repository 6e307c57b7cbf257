//! Session lifecycle handlers
//!
//! Endpoints for registration, login, token refresh, logout, password
//! changes, and token introspection.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use keygate_service::dto::{
    AccessTokenResponse, ChangePasswordRequest, CurrentUserResponse, LoginRequest,
    MessageResponse, PendingTwoFactorResponse, RefreshTokenRequest, RegisterRequest,
    TokenListResponse, UserResponse,
};
use keygate_service::{LoginOutcome, SessionService};

use crate::extractors::{AuthUser, ClientMeta, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<UserResponse>>> {
    let service = SessionService::new(state.service_context());
    let user = service.register(request).await?;
    Ok(Created(Json(UserResponse::from(user))))
}

/// Login with username and password
///
/// POST /auth/login
///
/// Returns a token pair, or a pending two-factor handle when the account
/// requires a second factor. Both outcomes are 200.
pub async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Response> {
    let service = SessionService::new(state.service_context());
    match service.login(request, &meta.ip, &meta.user_agent).await? {
        LoginOutcome::Authenticated(pair) => Ok(Json(pair).into_response()),
        LoginOutcome::TwoFactorRequired { pending_token } => {
            Ok(Json(PendingTwoFactorResponse::new(pending_token)).into_response())
        }
    }
}

/// Exchange a refresh token for a fresh token pair
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> ApiResult<Response> {
    let service = SessionService::new(state.service_context());
    let pair = service.refresh(&request.refresh_token).await?;
    Ok(Json(pair).into_response())
}

/// Sign out the session behind the presented access token
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let service = SessionService::new(state.service_context());
    service.logout(auth.user.id, &auth.access_secret).await?;
    Ok(Json(MessageResponse::new("Signed out.")))
}

/// Sign out every session of the authenticated user
///
/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let service = SessionService::new(state.service_context());
    service.logout_all(auth.user.id).await?;
    Ok(Json(MessageResponse::new("Signed out of all sessions.")))
}

/// Change the password and revoke every existing credential
///
/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = SessionService::new(state.service_context());
    service.change_password(auth.user.id, request).await?;
    Ok(Json(MessageResponse::new(
        "Password changed; all sessions have been signed out.",
    )))
}

/// Profile of the authenticated user
///
/// GET /auth/me
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = SessionService::new(state.service_context());
    let profile = service.current_user(auth.user.id).await?;
    Ok(Json(CurrentUserResponse::from(profile)))
}

/// List the caller's active access tokens
///
/// GET /auth/tokens
pub async fn list_tokens(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<TokenListResponse>> {
    let service = SessionService::new(state.service_context());
    let records = service.list_access_tokens(auth.user.id).await?;
    let tokens = records.iter().map(AccessTokenResponse::from).collect();
    Ok(Json(TokenListResponse { tokens }))
}
