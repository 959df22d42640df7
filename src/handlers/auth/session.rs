// handlers/auth/session.rs - register, login, logout, me
use axum::extract::State;
use serde::Deserialize;

use crate::auth::{generate_jwt, password, AuthError, Principal};
use crate::database::models::{NewUser, User};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, LogoutResponse, TokenResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<TokenResponse> {
    input.validate(false)?;
    let hash = password::hash_password(input.password.as_deref().unwrap_or_default())?;
    let id = User::insert(&state.pool, &input, &hash).await?;

    tracing::info!("registered user {} as {}", id, input.role_or_default());
    issue_token(&state, id).map(TokenResponse::created)
}

/// POST /api/v1/auth/login - unknown e-mail and wrong password fail identically
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let (email, candidate) = match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(candidate)) if !email.trim().is_empty() && !candidate.is_empty() => {
            (email, candidate)
        }
        _ => return Err(ApiError::bad_request("Please provide an email and password")),
    };

    let (id, hash) = User::credentials_by_email(&state.pool, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    if !password::verify_password(candidate, &hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    issue_token(&state, id)
}

/// GET /api/v1/auth/logout
pub async fn logout(State(state): State<AppState>) -> LogoutResponse {
    LogoutResponse::new(&state.config.security)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ApiResponse<User>> {
    let user = Repository::<User>::new(state.pool.clone())
        .select_404(principal.id)
        .await?;
    Ok(ApiResponse::success(user))
}

pub(super) fn issue_token(state: &AppState, user_id: uuid::Uuid) -> ApiResult<TokenResponse> {
    let token = generate_jwt(&state.config.security, user_id)?;
    Ok(TokenResponse::new(token, &state.config.security))
}
