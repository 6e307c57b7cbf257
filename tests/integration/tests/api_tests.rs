//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, check_test_env, fixtures::*, TestServer};
use reqwest::StatusCode;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = RegisterRequest::unique();

    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    let user: UserResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert!(user.id > 0);
    assert_eq!(user.username, request.username);
    assert_eq!(user.email, request.email);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let first = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &first).await.unwrap();

    // Same username, fresh email
    let second = RegisterRequest {
        username: first.username.clone(),
        email: format!("other{}@example.com", unique_suffix()),
        password: first.password.clone(),
    };
    let response = server.post("/api/v1/auth/register", &second).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(error.error.code, "USERNAME_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let first = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &first).await.unwrap();

    let second = RegisterRequest {
        username: format!("other{}", unique_suffix()),
        email: first.email.clone(),
        password: first.password.clone(),
    };
    let response = server.post("/api/v1/auth/register", &second).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(error.error.code, "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_weak_password() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut request = RegisterRequest::unique();
    request.password = "alllowercase1!".to_string();

    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_register_invalid_username_characters() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut request = RegisterRequest::unique();
    request.username = format!("bad name{}", unique_suffix());

    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "INVALID_USERNAME");
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, server.config.tokens.access_ttl_seconds());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    // Wrong password and unknown user must be indistinguishable
    let wrong_password = LoginRequest {
        username: register_req.username.clone(),
        password: "WrongPass123!".to_string(),
    };
    let response = server.post("/api/v1/auth/login", &wrong_password).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_CREDENTIALS");

    let unknown_user = LoginRequest {
        username: format!("ghost{}", unique_suffix()),
        password: "WrongPass123!".to_string(),
    };
    let response = server.post("/api/v1/auth/login", &unknown_user).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_CREDENTIALS");
}

// ============================================================================
// Authenticated Profile Tests
// ============================================================================

#[tokio::test]
async fn test_me_and_token_listing() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.username, register_req.username);
    assert!(!me.two_factor_enabled);

    let response = server.get_auth("/api/v1/auth/tokens", &pair.access_token).await.unwrap();
    let listing: TokenListResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listing.tokens.len(), 1);
    assert!(listing.tokens[0].id > 0);
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/auth/me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/v1/auth/me", "not-a-real-token")
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_TOKEN");
}

// ============================================================================
// Refresh Rotation Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_rotation() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let first: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let refresh_req = RefreshTokenRequest {
        refresh_token: first.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let second: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_ne!(second.refresh_token, first.refresh_token);

    // The new access token works; rotation does not touch earlier access tokens
    let response = server.get_auth("/api/v1/auth/me", &second.access_token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let response = server.get_auth("/api/v1/auth/me", &first.access_token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_refresh_replay_revokes_everything() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let first: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let refresh_req = RefreshTokenRequest {
        refresh_token: first.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let second: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    // Replaying the spent token trips the alarm
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "REFRESH_REUSE_DETECTED");

    // Every credential issued before the replay is dead
    let response = server.get_auth("/api/v1/auth/me", &second.access_token).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let refresh_req = RefreshTokenRequest {
        refresh_token: second.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let refresh_req = RefreshTokenRequest {
        refresh_token: "0".repeat(64),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_REFRESH_TOKEN");
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth_empty("/api/v1/auth/logout", &pair.access_token)
        .await
        .unwrap();
    let _: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();

    // The token no longer authenticates anything, logout included
    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    let response = server
        .post_auth_empty("/api/v1/auth/logout", &pair.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_all_kills_every_session() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let first: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let second: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth_empty("/api/v1/auth/logout-all", &first.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    for token in [&first.access_token, &second.access_token] {
        let response = server.get_auth("/api/v1/auth/me", token).await.unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }

    // Refresh tokens were revoked too
    let refresh_req = RefreshTokenRequest {
        refresh_token: second.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Password Change Tests
// ============================================================================

#[tokio::test]
async fn test_change_password_revokes_credentials() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let change_req = ChangePasswordRequest {
        current_password: register_req.password.clone(),
        new_password: "FreshPass456!".to_string(),
    };
    let response = server
        .post_auth("/api/v1/auth/change-password", &pair.access_token, &change_req)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Everything issued under the old password is dead
    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let new_login = LoginRequest {
        username: register_req.username.clone(),
        password: change_req.new_password.clone(),
    };
    let response = server.post("/api/v1/auth/login", &new_login).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_change_password_rejects_wrong_current() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let change_req = ChangePasswordRequest {
        current_password: "WrongPass123!".to_string(),
        new_password: "FreshPass456!".to_string(),
    };
    let response = server
        .post_auth("/api/v1/auth/change-password", &pair.access_token, &change_req)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // A failed change leaves the session untouched
    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Two-Factor Tests
// ============================================================================

/// Register a user, enable two-factor, and return the registration data
/// plus the user id. Leaves no live session behind.
async fn register_with_two_factor(server: &TestServer) -> (RegisterRequest, i64) {
    let register_req = RegisterRequest::unique();
    let response = server.post("/api/v1/auth/register", &register_req).await.unwrap();
    let user: UserResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let toggle_req = ToggleTwoFactorRequest {
        enabled: true,
        password: register_req.password.clone(),
        two_factor_code: None,
    };
    let response = server
        .post_auth("/api/v1/auth/2fa/toggle", &pair.access_token, &toggle_req)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth_empty("/api/v1/auth/logout", &pair.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    (register_req, user.id)
}

#[tokio::test]
async fn test_two_factor_login_flow() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, user_id) = register_with_two_factor(&server).await;

    // Password alone now yields a pending handle, not tokens
    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pending: PendingLoginResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!pending.two_factor_token.is_empty());

    // A wrong guess spends an attempt but keeps the login pending
    let bad_verify = VerifyCodeRequest {
        two_factor_token: pending.two_factor_token.clone(),
        two_factor_code: "000000".to_string(),
    };
    let response = server.post("/api/v1/auth/2fa/verify-code", &bad_verify).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.code, "INVALID_TWO_FACTOR_CODE");

    // The real code completes the session
    let code = server.two_factor_code_for(user_id).await.unwrap();
    let verify_req = VerifyCodeRequest {
        two_factor_token: pending.two_factor_token.clone(),
        two_factor_code: code,
    };
    let response = server.post("/api/v1/auth/2fa/verify-code", &verify_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(me.two_factor_enabled);
}

#[tokio::test]
async fn test_two_factor_request_code_throttled_per_client() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (register_req, _user_id) = register_with_two_factor(&server).await;

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pending: PendingLoginResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let request_req = RequestCodeRequest {
        two_factor_token: pending.two_factor_token.clone(),
    };

    // The login's own code is free; re-requests up to the threshold pass
    let threshold = server.config.two_factor.client_threshold;
    for _ in 0..threshold {
        let response = server
            .post("/api/v1/auth/2fa/request-code", &request_req)
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    // One more from the same client gets the full configured cooldown
    let response = server
        .post("/api/v1/auth/2fa/request-code", &request_req)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let delay = server.config.two_factor.client_delay_seconds;
    let header = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(header.as_deref(), Some(delay.to_string().as_str()));

    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error.code, "RATE_LIMITED");
    let details = error.error.details.expect("throttle details missing");
    assert_eq!(details["retry_after_seconds"].as_i64(), Some(delay));
}

#[tokio::test]
async fn test_two_factor_unknown_handle() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request_req = RequestCodeRequest {
        two_factor_token: "f".repeat(80),
    };
    let response = server
        .post("/api/v1/auth/2fa/request-code", &request_req)
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(error.error.code, "INVALID_PENDING_SESSION");
}

#[tokio::test]
async fn test_two_factor_toggle_requires_password() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let register_req = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &register_req).await.unwrap();

    let login_req = LoginRequest::from_register(&register_req);
    let response = server.post("/api/v1/auth/login", &login_req).await.unwrap();
    let pair: TokenPairResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let toggle_req = ToggleTwoFactorRequest {
        enabled: true,
        password: "WrongPass123!".to_string(),
        two_factor_code: None,
    };
    let response = server
        .post_auth("/api/v1/auth/2fa/toggle", &pair.access_token, &toggle_req)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // Nothing changed
    let response = server.get_auth("/api/v1/auth/me", &pair.access_token).await.unwrap();
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!me.two_factor_enabled);
}
