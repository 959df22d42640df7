use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Principal};
use crate::error::ApiError;
use crate::types::Role;

/// Role guard; layered inside `protect`, which has already attached the principal.
pub async fn authorize(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or(AuthError::MissingToken)?;

    check_role(principal, allowed)?;
    Ok(next.run(request).await)
}

pub fn check_role(principal: &Principal, allowed: &[Role]) -> Result<(), ApiError> {
    if principal.has_role(allowed) {
        return Ok(());
    }
    tracing::warn!("user {} with role {} denied", principal.id, principal.role);
    Err(ApiError::forbidden(format!(
        "User role {} is not authorized to access this route",
        principal.role
    )))
}
