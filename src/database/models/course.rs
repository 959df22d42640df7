use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{blank, Reference, ValidationErrors};
use crate::database::manager::DatabaseError;
use crate::filter::{field, FieldKind, Populate, ResourceSchema};

pub const COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "weeks",
    "tuition",
    "minimumSkill",
    "scholarshipAvailable",
    "createdAt",
    "bootcamp",
    "user",
];

pub const SCHEMA: ResourceSchema = ResourceSchema {
    table: "courses",
    fields: &[
        field("id", FieldKind::Uuid),
        field("title", FieldKind::Text),
        field("description", FieldKind::Text),
        field("weeks", FieldKind::Integer),
        field("tuition", FieldKind::Integer),
        field("minimumSkill", FieldKind::Text),
        field("scholarshipAvailable", FieldKind::Bool),
        field("createdAt", FieldKind::Timestamp),
        field("bootcamp", FieldKind::Uuid),
        field("user", FieldKind::Uuid),
    ],
};

/// Parent summary shared by course and review listings
pub const POPULATE_BOOTCAMP: Populate = Populate::Parent {
    field: "bootcamp",
    table: "bootcamps",
    columns: &["id", "name", "description"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimumSkill::Beginner => "beginner",
            MinimumSkill::Intermediate => "intermediate",
            MinimumSkill::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub tuition: i32,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
    pub bootcamp: Reference,
    pub user: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<i32>,
    pub tuition: Option<i32>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<i32>,
    pub tuition: Option<i32>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.title) {
            errors.add("title", "Please add a course title");
        }
        if blank(&self.description) {
            errors.add("description", "Please add a description");
        }
        errors.require("weeks", &self.weeks, "Please add number of weeks");
        errors.require("tuition", &self.tuition, "Please add a tuition cost");
        errors.require("minimumSkill", &self.minimum_skill, "Please add a minimum skill");
        check_ranges(&mut errors, self.weeks, self.tuition);
        errors.into_result()
    }
}

impl CourseUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.title.is_some() && blank(&self.title) {
            errors.add("title", "Please add a course title");
        }
        if self.description.is_some() && blank(&self.description) {
            errors.add("description", "Please add a description");
        }
        check_ranges(&mut errors, self.weeks, self.tuition);
        errors.into_result()
    }
}

fn check_ranges(errors: &mut ValidationErrors, weeks: Option<i32>, tuition: Option<i32>) {
    if weeks.is_some_and(|w| w < 1) {
        errors.add("weeks", "Weeks must be at least 1");
    }
    if tuition.is_some_and(|t| t < 0) {
        errors.add("tuition", "Tuition can not be negative");
    }
}

impl Course {
    pub async fn insert(
        pool: &PgPool,
        bootcamp: Uuid,
        owner: Uuid,
        input: &CourseInput,
    ) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO "courses"
               ("id", "title", "description", "weeks", "tuition", "minimumSkill",
                "scholarshipAvailable", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(id)
        .bind(input.title.as_deref().unwrap_or_default().trim())
        .bind(input.description.as_deref().unwrap_or_default())
        .bind(input.weeks.unwrap_or(1))
        .bind(input.tuition.unwrap_or(0))
        .bind(input.minimum_skill.unwrap_or(MinimumSkill::Beginner).as_str())
        .bind(input.scholarship_available.unwrap_or(false))
        .bind(bootcamp)
        .bind(owner)
        .execute(pool)
        .await?;
        Ok(id)
    }

    pub async fn update(pool: &PgPool, id: Uuid, input: &CourseUpdate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"UPDATE "courses" SET
               "title" = COALESCE($2, "title"),
               "description" = COALESCE($3, "description"),
               "weeks" = COALESCE($4, "weeks"),
               "tuition" = COALESCE($5, "tuition"),
               "minimumSkill" = COALESCE($6, "minimumSkill"),
               "scholarshipAvailable" = COALESCE($7, "scholarshipAvailable")
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(input.description.as_deref())
        .bind(input.weeks)
        .bind(input.tuition)
        .bind(input.minimum_skill.map(|s| s.as_str()))
        .bind(input.scholarship_available)
        .execute(pool)
        .await?;
        Ok(())
    }
}
