// handlers/reviews.rs - /api/v1/reviews and /api/v1/bootcamps/:id/reviews
use axum::extract::{Query, State};
use uuid::Uuid;

use crate::auth::{ensure_owner, Principal};
use crate::database::models::{course, review, Bootcamp, Review, ReviewInput, ReviewUpdate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::{Filter, QueryParams};
use crate::middleware::{
    empty, ApiJson, ApiPath, ApiResponse, ApiResult, CollectionResponse, ListResponse,
};
use crate::services::aggregates;
use crate::state::AppState;

/// GET /api/v1/reviews - filtered, paged listing with the bootcamp summary embedded
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<ListResponse> {
    let mut filter = Filter::from_query(review::SCHEMA, &params, &state.config.query)?;
    filter.populate(course::POPULATE_BOOTCAMP);

    let results = Repository::<Review>::new(state.pool.clone())
        .select_paged(filter)
        .await?;
    Ok(results.into())
}

/// GET /api/v1/bootcamps/:id/reviews
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
) -> ApiResult<CollectionResponse<Review>> {
    let reviews = Repository::<Review>::new(state.pool.clone())
        .select_children("bootcamp", bootcamp_id)
        .await?;
    Ok(CollectionResponse::new(reviews))
}

/// GET /api/v1/reviews/:id
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Review>> {
    let review = Repository::<Review>::new(state.pool.clone())
        .select_one_populated(id, Some(course::POPULATE_BOOTCAMP))
        .await?
        .ok_or_else(|| ApiError::missing("Review", id))?;
    Ok(ApiResponse::success(review))
}

/// POST /api/v1/bootcamps/:id/reviews - one review per user per bootcamp
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> ApiResult<ApiResponse<Review>> {
    let bootcamp = Repository::<Bootcamp>::new(state.pool.clone())
        .select_one(bootcamp_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No bootcamp with the id of {}", bootcamp_id)))?;
    input.validate()?;

    let id = Review::insert(&state.pool, bootcamp.id, principal.id, &input).await?;
    aggregates::refresh_rating(&state.pool, bootcamp.id).await;

    let review = Repository::<Review>::new(state.pool.clone())
        .select_404(id)
        .await?;
    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReviewUpdate>,
) -> ApiResult<ApiResponse<Review>> {
    let repo = Repository::<Review>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, &format!("update review {}", id))?;
    input.validate()?;

    Review::update(&state.pool, id, &input).await?;
    aggregates::refresh_rating(&state.pool, existing.bootcamp.id()).await;

    Ok(ApiResponse::success(repo.select_404(id).await?))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let repo = Repository::<Review>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, &format!("delete review {}", id))?;

    repo.delete_404(id).await?;
    aggregates::refresh_rating(&state.pool, existing.bootcamp.id()).await;
    Ok(empty())
}
