use sqlx::PgPool;
use uuid::Uuid;

use crate::database::DatabaseError;

/// Store the mean review rating on the bootcamp, NULL once no review is left.
pub async fn update_average_rating(pool: &PgPool, bootcamp: Uuid) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"UPDATE "bootcamps" SET "averageRating" = (
               SELECT AVG("rating")::float8 FROM "reviews" WHERE "bootcamp" = $1
           ) WHERE "id" = $1"#,
    )
    .bind(bootcamp)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store the mean tuition rounded up to the next multiple of ten.
pub async fn update_average_cost(pool: &PgPool, bootcamp: Uuid) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"UPDATE "bootcamps" SET "averageCost" = (
               SELECT (CEIL(AVG("tuition") / 10) * 10)::int FROM "courses" WHERE "bootcamp" = $1
           ) WHERE "id" = $1"#,
    )
    .bind(bootcamp)
    .execute(pool)
    .await?;
    Ok(())
}

/// Recompute after a review write. The write itself stands even if this fails.
pub async fn refresh_rating(pool: &PgPool, bootcamp: Uuid) {
    if let Err(e) = update_average_rating(pool, bootcamp).await {
        tracing::error!("Failed to recompute average rating for bootcamp {}: {}", bootcamp, e);
    }
}

/// Recompute after a course write. The write itself stands even if this fails.
pub async fn refresh_cost(pool: &PgPool, bootcamp: Uuid) {
    if let Err(e) = update_average_cost(pool, bootcamp).await {
        tracing::error!("Failed to recompute average cost for bootcamp {}: {}", bootcamp, e);
    }
}
