use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{blank, is_valid_email, is_valid_http_url, Course, ValidationErrors};
use crate::database::manager::DatabaseError;
use crate::filter::{field, FieldKind, Populate, ResourceSchema};

pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

pub const SCHEMA: ResourceSchema = ResourceSchema {
    table: "bootcamps",
    fields: &[
        field("id", FieldKind::Uuid),
        field("name", FieldKind::Text),
        field("slug", FieldKind::Text),
        field("description", FieldKind::Text),
        field("website", FieldKind::Text),
        field("phone", FieldKind::Text),
        field("email", FieldKind::Text),
        field("location", FieldKind::Json),
        field("careers", FieldKind::TextArray),
        field("averageRating", FieldKind::Float),
        field("averageCost", FieldKind::Integer),
        field("photo", FieldKind::Text),
        field("housing", FieldKind::Bool),
        field("jobAssistance", FieldKind::Bool),
        field("jobGuarantee", FieldKind::Bool),
        field("acceptGi", FieldKind::Bool),
        field("createdAt", FieldKind::Timestamp),
        field("user", FieldKind::Uuid),
    ],
};

/// Bootcamp listings embed their courses
pub const POPULATE_COURSES: Populate = Populate::Children {
    name: "courses",
    table: "courses",
    foreign_key: "bootcamp",
    columns: super::course::COLUMNS,
};

/// GeoJSON point plus the address parts the geocoder resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Location,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<i64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
    pub user: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
}

/// Create payload. `address` is geocoded into `location` and never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl BootcampInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.name) {
            errors.add("name", "Please add a name");
        }
        if blank(&self.description) {
            errors.add("description", "Please add a description");
        }
        if blank(&self.address) {
            errors.add("address", "Please add an address");
        }
        if self.careers.as_ref().map_or(true, Vec::is_empty) {
            errors.add("careers", "Please add at least one career");
        }
        check_common(
            &mut errors,
            self.name.as_deref(),
            self.description.as_deref(),
            self.website.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
            self.careers.as_deref(),
        );
        errors.into_result()
    }
}

impl BootcampUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.is_some() && blank(&self.name) {
            errors.add("name", "Please add a name");
        }
        if self.description.is_some() && blank(&self.description) {
            errors.add("description", "Please add a description");
        }
        if self.address.is_some() && blank(&self.address) {
            errors.add("address", "Please add an address");
        }
        if self.careers.as_ref().is_some_and(Vec::is_empty) {
            errors.add("careers", "Please add at least one career");
        }
        check_common(
            &mut errors,
            self.name.as_deref(),
            self.description.as_deref(),
            self.website.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
            self.careers.as_deref(),
        );
        errors.into_result()
    }
}

fn check_common(
    errors: &mut ValidationErrors,
    name: Option<&str>,
    description: Option<&str>,
    website: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    careers: Option<&[String]>,
) {
    if name.is_some_and(|n| n.trim().chars().count() > 50) {
        errors.add("name", "Name can not be more than 50 characters");
    }
    if description.is_some_and(|d| d.chars().count() > 500) {
        errors.add("description", "Description can not be more than 500 characters");
    }
    if website.is_some_and(|w| !is_valid_http_url(w)) {
        errors.add("website", "Please use a valid URL with HTTP or HTTPS");
    }
    if phone.is_some_and(|p| p.chars().count() > 20) {
        errors.add("phone", "Phone number can not be longer than 20 characters");
    }
    if email.is_some_and(|e| !is_valid_email(e)) {
        errors.add("email", "Please add a valid email");
    }
    if let Some(unknown) = careers
        .unwrap_or_default()
        .iter()
        .find(|c| !CAREERS.contains(&c.as_str()))
    {
        errors.add("careers", format!("'{}' is not a supported career", unknown));
    }
}

/// URL-safe lowercase form of a bootcamp name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

impl Bootcamp {
    pub async fn insert(
        pool: &PgPool,
        owner: Uuid,
        input: &BootcampInput,
        location: &Location,
    ) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        let name = input.name.as_deref().unwrap_or_default().trim();
        sqlx::query(
            r#"INSERT INTO "bootcamps"
               ("id", "name", "slug", "description", "website", "phone", "email", "location",
                "careers", "housing", "jobAssistance", "jobGuarantee", "acceptGi", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(id)
        .bind(name)
        .bind(slugify(name))
        .bind(input.description.as_deref().unwrap_or_default())
        .bind(input.website.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.email.as_deref())
        .bind(Json(location))
        .bind(input.careers.clone().unwrap_or_default())
        .bind(input.housing.unwrap_or(false))
        .bind(input.job_assistance.unwrap_or(false))
        .bind(input.job_guarantee.unwrap_or(false))
        .bind(input.accept_gi.unwrap_or(false))
        .bind(owner)
        .execute(pool)
        .await?;
        Ok(id)
    }

    /// Apply a partial update. A new name re-derives the slug; a new location replaces the old one.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &BootcampUpdate,
        location: Option<&Location>,
    ) -> Result<(), DatabaseError> {
        let name = input.name.as_deref().map(str::trim);
        sqlx::query(
            r#"UPDATE "bootcamps" SET
               "name" = COALESCE($2, "name"),
               "slug" = COALESCE($3, "slug"),
               "description" = COALESCE($4, "description"),
               "website" = COALESCE($5, "website"),
               "phone" = COALESCE($6, "phone"),
               "email" = COALESCE($7, "email"),
               "location" = COALESCE($8, "location"),
               "careers" = COALESCE($9, "careers"),
               "housing" = COALESCE($10, "housing"),
               "jobAssistance" = COALESCE($11, "jobAssistance"),
               "jobGuarantee" = COALESCE($12, "jobGuarantee"),
               "acceptGi" = COALESCE($13, "acceptGi")
               WHERE "id" = $1"#,
        )
        .bind(id)
        .bind(name)
        .bind(name.map(slugify))
        .bind(input.description.as_deref())
        .bind(input.website.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.email.as_deref())
        .bind(location.map(Json))
        .bind(input.careers.clone())
        .bind(input.housing)
        .bind(input.job_assistance)
        .bind(input.job_guarantee)
        .bind(input.accept_gi)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_photo(pool: &PgPool, id: Uuid, photo: &str) -> Result<(), DatabaseError> {
        sqlx::query(r#"UPDATE "bootcamps" SET "photo" = $2 WHERE "id" = $1"#)
            .bind(id)
            .bind(photo)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of bootcamps a user already publishes
    pub async fn count_owned_by(pool: &PgPool, owner: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "bootcamps" WHERE "user" = $1"#)
            .bind(owner)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
