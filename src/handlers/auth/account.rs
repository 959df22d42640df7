// handlers/auth/account.rs - self-service name, e-mail and password changes
use axum::extract::State;
use serde::Deserialize;

use super::session::issue_token;
use crate::auth::{password, Principal};
use crate::database::models::user::validate_new_password;
use crate::database::models::{User, UserUpdate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TokenResponse};
use crate::state::AppState;

/// Only these two fields are honoured; a role in the body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<DetailsRequest>,
) -> ApiResult<ApiResponse<User>> {
    let update = UserUpdate {
        name: request.name,
        email: request.email,
        role: None,
    };
    update.validate()?;
    User::update(&state.pool, principal.id, &update).await?;

    let user = Repository::<User>::new(state.pool.clone())
        .select_404(principal.id)
        .await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/updatepassword - re-issues the session token
pub async fn update_password(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(request): ApiJson<PasswordChangeRequest>,
) -> ApiResult<TokenResponse> {
    let new_password = validate_new_password(request.new_password.as_deref())?;

    let hash = User::password_hash(&state.pool, principal.id)
        .await?
        .ok_or_else(|| ApiError::missing("User", principal.id))?;
    let current = request.current_password.as_deref().unwrap_or_default();
    if !password::verify_password(current, &hash)? {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    let new_hash = password::hash_password(new_password)?;
    User::set_password(&state.pool, principal.id, &new_hash).await?;
    tracing::info!("user {} changed their password", principal.id);

    issue_token(&state, principal.id)
}
