// handlers/auth/reset.rs - forgot-password e-mail and token redemption
use axum::extract::State;
use serde::Deserialize;

use super::session::issue_token;
use crate::auth::password::hash_password;
use crate::auth::reset::{hash_token, ResetToken};
use crate::database::models::user::validate_new_password;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, TokenResponse};
use crate::services::mailer::reset_message;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// POST /api/v1/auth/forgotpassword
///
/// Stores the hash of a fresh token and mails the plain token. If the mail
/// cannot be sent the token is withdrawn again.
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<ApiResponse<&'static str>> {
    let email = request.email.as_deref().unwrap_or_default().trim();
    let user_id = User::id_by_email(&state.pool, email)
        .await?
        .ok_or_else(|| ApiError::not_found("There is no user with that email"))?;

    let reset = ResetToken::generate(state.config.security.reset_token_expiry_minutes);
    User::set_reset_token(&state.pool, user_id, &reset.hash, reset.expires).await?;

    let url = reset_url(&state.config.api.public_url, &reset.token);
    if let Err(e) = state.mailer.send(reset_message(email, &url)).await {
        tracing::error!("reset mail to user {} failed: {}", user_id, e);
        User::clear_reset_token(&state.pool, user_id).await?;
        return Err(e.into());
    }

    Ok(ApiResponse::success("Email sent"))
}

/// PUT /api/v1/auth/resetpassword/:token
pub async fn reset_password(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> ApiResult<TokenResponse> {
    let password = validate_new_password(request.password.as_deref())?;
    let user_id = User::id_by_reset_token(&state.pool, &hash_token(&token))
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid token"))?;

    let hash = hash_password(password)?;
    User::set_password(&state.pool, user_id, &hash).await?;
    tracing::info!("user {} reset their password", user_id);

    issue_token(&state, user_id)
}

/// Built from the configured public URL, never from the request's Host header
fn reset_url(public_url: &str, token: &str) -> String {
    format!(
        "{}/api/v1/auth/resetpassword/{}",
        public_url.trim_end_matches('/'),
        token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_url_points_at_the_redemption_route() {
        assert_eq!(
            reset_url("https://devcamper.io/", "abc123"),
            "https://devcamper.io/api/v1/auth/resetpassword/abc123"
        );
    }
}
