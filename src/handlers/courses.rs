// handlers/courses.rs - /api/v1/courses and /api/v1/bootcamps/:id/courses
use axum::extract::{Query, State};
use uuid::Uuid;

use crate::auth::{ensure_owner, Principal};
use crate::database::models::{course, Bootcamp, Course, CourseInput, CourseUpdate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::{Filter, QueryParams};
use crate::middleware::{
    empty, ApiJson, ApiPath, ApiResponse, ApiResult, CollectionResponse, ListResponse,
};
use crate::services::aggregates;
use crate::state::AppState;

/// GET /api/v1/courses - filtered, paged listing with the bootcamp summary embedded
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<ListResponse> {
    let mut filter = Filter::from_query(course::SCHEMA, &params, &state.config.query)?;
    filter.populate(course::POPULATE_BOOTCAMP);

    let results = Repository::<Course>::new(state.pool.clone())
        .select_paged(filter)
        .await?;
    Ok(results.into())
}

/// GET /api/v1/bootcamps/:id/courses - every course of one bootcamp, unpaged
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
) -> ApiResult<CollectionResponse<Course>> {
    let courses = Repository::<Course>::new(state.pool.clone())
        .select_children("bootcamp", bootcamp_id)
        .await?;
    Ok(CollectionResponse::new(courses))
}

/// GET /api/v1/courses/:id
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Course>> {
    let course = Repository::<Course>::new(state.pool.clone())
        .select_one_populated(id, Some(course::POPULATE_BOOTCAMP))
        .await?
        .ok_or_else(|| ApiError::missing("Course", id))?;
    Ok(ApiResponse::success(course))
}

/// POST /api/v1/bootcamps/:id/courses - only the bootcamp owner (or an admin) adds courses
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CourseInput>,
) -> ApiResult<ApiResponse<Course>> {
    let bootcamp = Repository::<Bootcamp>::new(state.pool.clone())
        .select_404(bootcamp_id)
        .await?;
    ensure_owner(&principal, bootcamp.user, &format!("add a course to bootcamp {}", bootcamp.id))?;
    input.validate()?;

    let id = Course::insert(&state.pool, bootcamp.id, principal.id, &input).await?;
    aggregates::refresh_cost(&state.pool, bootcamp.id).await;

    let course = Repository::<Course>::new(state.pool.clone())
        .select_404(id)
        .await?;
    Ok(ApiResponse::created(course))
}

/// PUT /api/v1/courses/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CourseUpdate>,
) -> ApiResult<ApiResponse<Course>> {
    let repo = Repository::<Course>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, &format!("update course {}", id))?;
    input.validate()?;

    Course::update(&state.pool, id, &input).await?;
    aggregates::refresh_cost(&state.pool, existing.bootcamp.id()).await;

    Ok(ApiResponse::success(repo.select_404(id).await?))
}

/// DELETE /api/v1/courses/:id
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let repo = Repository::<Course>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, &format!("delete course {}", id))?;

    repo.delete_404(id).await?;
    aggregates::refresh_cost(&state.pool, existing.bootcamp.id()).await;
    Ok(empty())
}
