use anyhow::Context;
use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::DatabaseConfig;
use crate::database::models::{
    Bootcamp, BootcampInput, Course, CourseInput, Location, NewUser, Review, ReviewInput, User,
};
use crate::database::DatabaseManager;
use crate::services::aggregates;

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Import users, bootcamps, courses and reviews from JSON fixtures")]
    Import {
        #[arg(long, help = "Fixture directory", default_value = "fixtures")]
        dir: PathBuf,
    },

    #[command(about = "Delete every user, bootcamp, course and review")]
    Delete,
}

/// Fixture records carry their own keys; references between files use those keys.
#[derive(Debug, Deserialize)]
pub struct UserFixture {
    pub id: String,
    #[serde(flatten)]
    pub user: NewUser,
}

/// Bootcamp fixtures carry a resolved `location`, so seeding never calls the geocoder.
#[derive(Debug, Deserialize)]
pub struct BootcampFixture {
    pub id: String,
    pub user: String,
    pub location: Location,
    #[serde(flatten)]
    pub bootcamp: BootcampInput,
}

#[derive(Debug, Deserialize)]
pub struct CourseFixture {
    pub id: String,
    pub bootcamp: String,
    pub user: String,
    #[serde(flatten)]
    pub course: CourseInput,
}

#[derive(Debug, Deserialize)]
pub struct ReviewFixture {
    pub id: String,
    pub bootcamp: String,
    pub user: String,
    #[serde(flatten)]
    pub review: ReviewInput,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub bootcamps: usize,
    pub courses: usize,
    pub reviews: usize,
}

pub async fn handle(
    cmd: SeedCommands,
    database: &DatabaseConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(database).await?;
    DatabaseManager::migrate(&pool).await?;

    let result = match cmd {
        SeedCommands::Import { dir } => {
            let summary = import(&pool, &dir).await?;
            output_success(
                output_format,
                "Data imported",
                Some(json!({
                    "users": summary.users,
                    "bootcamps": summary.bootcamps,
                    "courses": summary.courses,
                    "reviews": summary.reviews,
                })),
            )
        }
        SeedCommands::Delete => {
            delete_all(&pool).await?;
            output_success(output_format, "Data deleted", None)
        }
    };

    pool.close().await;
    result
}

/// Load every fixture file under `dir` and insert it, resolving fixture keys to fresh ids.
pub async fn import(pool: &PgPool, dir: &Path) -> anyhow::Result<SeedSummary> {
    let users: Vec<UserFixture> = read_fixture(dir, "users.json").await?;
    let bootcamps: Vec<BootcampFixture> = read_fixture(dir, "bootcamps.json").await?;
    let courses: Vec<CourseFixture> = read_fixture(dir, "courses.json").await?;
    let reviews: Vec<ReviewFixture> = read_fixture(dir, "reviews.json").await?;

    let mut user_ids = HashMap::new();
    for fixture in &users {
        fixture
            .user
            .validate(true)
            .with_context(|| format!("user fixture {}", fixture.id))?;
        let hash = hash_password(fixture.user.password.as_deref().unwrap_or_default())?;
        let id = User::insert(pool, &fixture.user, &hash).await?;
        user_ids.insert(fixture.id.as_str(), id);
    }

    let mut bootcamp_ids = HashMap::new();
    for fixture in &bootcamps {
        fixture
            .bootcamp
            .validate()
            .with_context(|| format!("bootcamp fixture {}", fixture.id))?;
        let owner = resolve(&user_ids, &fixture.user, "user")?;
        let id = Bootcamp::insert(pool, owner, &fixture.bootcamp, &fixture.location).await?;
        bootcamp_ids.insert(fixture.id.as_str(), id);
    }

    for fixture in &courses {
        fixture
            .course
            .validate()
            .with_context(|| format!("course fixture {}", fixture.id))?;
        let bootcamp = resolve(&bootcamp_ids, &fixture.bootcamp, "bootcamp")?;
        let owner = resolve(&user_ids, &fixture.user, "user")?;
        Course::insert(pool, bootcamp, owner, &fixture.course).await?;
    }

    for fixture in &reviews {
        fixture
            .review
            .validate()
            .with_context(|| format!("review fixture {}", fixture.id))?;
        let bootcamp = resolve(&bootcamp_ids, &fixture.bootcamp, "bootcamp")?;
        let author = resolve(&user_ids, &fixture.user, "user")?;
        Review::insert(pool, bootcamp, author, &fixture.review).await?;
    }

    for &bootcamp in bootcamp_ids.values() {
        aggregates::update_average_cost(pool, bootcamp).await?;
        aggregates::update_average_rating(pool, bootcamp).await?;
    }

    let summary = SeedSummary {
        users: users.len(),
        bootcamps: bootcamps.len(),
        courses: courses.len(),
        reviews: reviews.len(),
    };
    tracing::info!("seeded {:?} from {}", summary, dir.display());
    Ok(summary)
}

pub async fn delete_all(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(r#"TRUNCATE "reviews", "courses", "bootcamps", "users" CASCADE"#)
        .execute(pool)
        .await?;
    Ok(())
}

/// A missing file seeds nothing of that kind.
async fn read_fixture<T: DeserializeOwned>(dir: &Path, name: &str) -> anyhow::Result<Vec<T>> {
    let path = dir.join(name);
    if !tokio::fs::try_exists(&path).await? {
        tracing::warn!("no fixture file at {}", path.display());
        return Ok(Vec::new());
    }
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_fixture(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_fixture<T: DeserializeOwned>(text: &str) -> anyhow::Result<Vec<T>> {
    Ok(serde_json::from_str(text)?)
}

fn resolve(ids: &HashMap<&str, Uuid>, key: &str, kind: &str) -> anyhow::Result<Uuid> {
    ids.get(key)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("fixture references unknown {} '{}'", kind, key))
}
