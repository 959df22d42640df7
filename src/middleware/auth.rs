use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, AuthError, Principal};
use crate::database::models::User;
use crate::database::Repository;
use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token guard. Resolves the token's user and attaches it as the request `Principal`.
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = validate_jwt(&state.config.security, token)?;

    let user = Repository::<User>::new(state.pool.clone())
        .select_one(claims.id)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    tracing::debug!("authenticated {} ({}) as {}", user.email, user.id, user.role);
    request.extensions_mut().insert(Principal::from(user));

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Authorization header is not valid text".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingToken),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::from(AuthError::MissingToken))
    }
}
