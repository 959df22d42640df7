use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{blank, Reference, ValidationErrors};
use crate::database::manager::DatabaseError;
use crate::filter::{field, FieldKind, ResourceSchema};

pub const SCHEMA: ResourceSchema = ResourceSchema {
    table: "reviews",
    fields: &[
        field("id", FieldKind::Uuid),
        field("title", FieldKind::Text),
        field("text", FieldKind::Text),
        field("rating", FieldKind::Integer),
        field("createdAt", FieldKind::Timestamp),
        field("bootcamp", FieldKind::Uuid),
        field("user", FieldKind::Uuid),
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub bootcamp: Reference,
    pub user: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.title) {
            errors.add("title", "Please add a title for the review");
        }
        if blank(&self.text) {
            errors.add("text", "Please add some text");
        }
        errors.require("rating", &self.rating, "Please add a rating between 1 and 10");
        check(&mut errors, self.title.as_deref(), self.rating);
        errors.into_result()
    }
}

impl ReviewUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.title.is_some() && blank(&self.title) {
            errors.add("title", "Please add a title for the review");
        }
        if self.text.is_some() && blank(&self.text) {
            errors.add("text", "Please add some text");
        }
        check(&mut errors, self.title.as_deref(), self.rating);
        errors.into_result()
    }
}

fn check(errors: &mut ValidationErrors, title: Option<&str>, rating: Option<i32>) {
    if title.is_some_and(|t| t.trim().chars().count() > 100) {
        errors.add("title", "Title can not be more than 100 characters");
    }
    if rating.is_some_and(|r| !(1..=10).contains(&r)) {
        errors.add("rating", "Please add a rating between 1 and 10");
    }
}

impl Review {
    pub async fn insert(
        pool: &PgPool,
        bootcamp: Uuid,
        author: Uuid,
        input: &ReviewInput,
    ) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO "reviews" ("id", "title", "text", "rating", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(id)
        .bind(input.title.as_deref().unwrap_or_default().trim())
        .bind(input.text.as_deref().unwrap_or_default())
        .bind(input.rating.unwrap_or_default())
        .bind(bootcamp)
        .bind(author)
        .execute(pool)
        .await?;
        Ok(id)
    }

    pub async fn update(pool: &PgPool, id: Uuid, input: &ReviewUpdate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "reviews" SET
               "title" = COALESCE($2, "title"),
               "text" = COALESCE($3, "text"),
               "rating" = COALESCE($4, "rating")
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(input.text.as_deref())
        .bind(input.rating)
        .execute(pool)
        .await?;
        Ok(())
    }
}
