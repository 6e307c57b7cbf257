//! Two-factor authentication handlers
//!
//! Endpoints for completing a pending login and for enabling or
//! disabling the second factor on an account.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use keygate_service::dto::{
    MessageResponse, RequestCodeRequest, ToggleTwoFactorRequest, VerifyCodeRequest,
};
use keygate_service::TwoFactorService;

use crate::extractors::{AuthUser, ClientMeta, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Request a replacement verification code for a pending login
///
/// POST /auth/2fa/request-code
pub async fn request_code(
    State(state): State<AppState>,
    meta: ClientMeta,
    ValidatedJson(request): ValidatedJson<RequestCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = TwoFactorService::new(state.service_context());
    service
        .request_new_code(&request.two_factor_token, &meta.ip, &meta.user_agent)
        .await?;
    Ok(Json(MessageResponse::new(
        "A new verification code has been sent.",
    )))
}

/// Verify a code and complete the pending login
///
/// POST /auth/2fa/verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyCodeRequest>,
) -> ApiResult<Response> {
    let service = TwoFactorService::new(state.service_context());
    let pair = service
        .verify_code(&request.two_factor_token, &request.two_factor_code)
        .await?;
    Ok(Json(pair).into_response())
}

/// Enable or disable two-factor authentication for the account
///
/// POST /auth/2fa/toggle
pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ToggleTwoFactorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = TwoFactorService::new(state.service_context());
    let enabled = service.toggle(auth.user.id, request).await?;
    let message = if enabled {
        "Two-factor authentication is enabled."
    } else {
        "Two-factor authentication is disabled."
    };
    Ok(Json(MessageResponse::new(message)))
}
