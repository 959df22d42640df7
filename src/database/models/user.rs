use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{blank, is_valid_email, ValidationErrors};
use crate::database::manager::DatabaseError;
use crate::filter::{field, FieldKind, ResourceSchema};
use crate::types::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Readable user columns. The password hash and reset fields are absent on purpose:
/// nothing built from this schema can project them.
pub const SCHEMA: ResourceSchema = ResourceSchema {
    table: "users",
    fields: &[
        field("id", FieldKind::Uuid),
        field("name", FieldKind::Text),
        field("email", FieldKind::Text),
        field("role", FieldKind::Text),
        field("createdAt", FieldKind::Timestamp),
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration and admin-create payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Admin update and self-service details update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl NewUser {
    /// `allow_admin` is false for self-registration.
    pub fn validate(&self, allow_admin: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.name) {
            errors.add("name", "Please add a name");
        }
        match self.email.as_deref().map(str::trim) {
            None | Some("") => errors.add("email", "Please add an email"),
            Some(email) if !is_valid_email(email) => errors.add("email", "Please add a valid email"),
            _ => {}
        }
        match self.password.as_deref() {
            None | Some("") => errors.add("password", "Please add a password"),
            Some(p) if p.chars().count() < MIN_PASSWORD_LEN => errors.add(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ),
            _ => {}
        }
        if !allow_admin && self.role.is_some_and(|r| !r.is_self_assignable()) {
            errors.add("role", "Role must be user or publisher");
        }
        errors.into_result()
    }

    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or(Role::User)
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.is_some() && blank(&self.name) {
            errors.add("name", "Please add a name");
        }
        if self.email.as_deref().is_some_and(|e| !is_valid_email(e.trim())) {
            errors.add("email", "Please add a valid email");
        }
        errors.into_result()
    }
}

pub fn validate_new_password(password: Option<&str>) -> Result<&str, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    match password {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => return Ok(p),
        Some(p) if !p.is_empty() => errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ),
        _ => errors.add("password", "Please add a password"),
    }
    Err(errors)
}

impl User {
    pub async fn insert(
        pool: &PgPool,
        input: &NewUser,
        password_hash: &str,
    ) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO "users" ("id", "name", "email", "role", "password")
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(input.name.as_deref().unwrap_or_default().trim())
        .bind(input.email.as_deref().unwrap_or_default().trim())
        .bind(input.role_or_default().as_str())
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(id)
    }

    pub async fn update(pool: &PgPool, id: Uuid, input: &UserUpdate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "users" SET
               "name" = COALESCE($2, "name"),
               "email" = COALESCE($3, "email"),
               "role" = COALESCE($4, "role")
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.email.as_deref().map(str::trim))
        .bind(input.role.map(|r| r.as_str()))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The only read that selects the password hash
    pub async fn credentials_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<(Uuid, String)>, DatabaseError> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"SELECT "id", "password" FROM "users" WHERE "email" = $1"#,
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn password_hash(pool: &PgPool, id: Uuid) -> Result<Option<String>, DatabaseError> {
        let hash = sqlx::query_scalar::<_, String>(r#"SELECT "password" FROM "users" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(hash)
    }

    pub async fn id_by_email(pool: &PgPool, email: &str) -> Result<Option<Uuid>, DatabaseError> {
        let id = sqlx::query_scalar::<_, Uuid>(r#"SELECT "id" FROM "users" WHERE "email" = $1"#)
            .bind(email.trim())
            .fetch_optional(pool)
            .await?;
        Ok(id)
    }

    /// Store a new password hash and drop any outstanding reset token.
    pub async fn set_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "users" SET "password" = $2,
               "resetPasswordToken" = NULL, "resetPasswordExpire" = NULL
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "users" SET "resetPasswordToken" = $2, "resetPasswordExpire" = $3
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "users" SET "resetPasswordToken" = NULL, "resetPasswordExpire" = NULL
               WHERE "id" = $1"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// User holding this reset-token hash, if it has not expired yet
    pub async fn id_by_reset_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Uuid>, DatabaseError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT "id" FROM "users"
               WHERE "resetPasswordToken" = $1 AND "resetPasswordExpire" > now()"#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;
        Ok(id)
    }
}
