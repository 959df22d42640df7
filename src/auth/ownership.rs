use serde::Serialize;
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::types::Role;

/// The authenticated user attached to a request by the `protect` guard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Owner or admin may act on a record; everybody else gets 403.
pub fn ensure_owner(principal: &Principal, owner: Uuid, action: &str) -> Result<(), ApiError> {
    if principal.id == owner || principal.is_admin() {
        return Ok(());
    }
    tracing::debug!("user {} denied {} on record owned by {}", principal.id, action, owner);
    Err(ApiError::forbidden(format!(
        "User {} is not authorized to {}",
        principal.id, action
    )))
}
