// handlers/bootcamps/bootcamp.rs - /api/v1/bootcamps[/:id] CRUD
use axum::extract::{Query, State};
use uuid::Uuid;

use crate::auth::{ensure_owner, Principal};
use crate::database::models::{bootcamp, Bootcamp, BootcampInput, BootcampUpdate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::{Filter, QueryParams};
use crate::middleware::{empty, ApiJson, ApiPath, ApiResponse, ApiResult, ListResponse};
use crate::state::AppState;

/// GET /api/v1/bootcamps - filtered, paged listing with courses embedded
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<ListResponse> {
    let mut filter = Filter::from_query(bootcamp::SCHEMA, &params, &state.config.query)?;
    filter.populate(bootcamp::POPULATE_COURSES);

    let results = Repository::<Bootcamp>::new(state.pool.clone())
        .select_paged(filter)
        .await?;
    Ok(results.into())
}

/// GET /api/v1/bootcamps/:id
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Bootcamp>> {
    let bootcamp = Repository::<Bootcamp>::new(state.pool.clone())
        .select_404(id)
        .await?;
    Ok(ApiResponse::success(bootcamp))
}

/// POST /api/v1/bootcamps - publishers may own a single bootcamp; admins any number
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(input): ApiJson<BootcampInput>,
) -> ApiResult<ApiResponse<Bootcamp>> {
    if !principal.is_admin() && Bootcamp::count_owned_by(&state.pool, principal.id).await? > 0 {
        return Err(ApiError::bad_request(format!(
            "The user with ID {} has already published a bootcamp",
            principal.id
        )));
    }
    input.validate()?;

    let address = input.address.as_deref().unwrap_or_default();
    let location = state.geocoder.geocode(address).await?;
    let id = Bootcamp::insert(&state.pool, principal.id, &input, &location).await?;

    let bootcamp = Repository::<Bootcamp>::new(state.pool.clone())
        .select_404(id)
        .await?;
    tracing::info!("bootcamp {} created by {}", bootcamp.id, principal.id);
    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<BootcampUpdate>,
) -> ApiResult<ApiResponse<Bootcamp>> {
    let repo = Repository::<Bootcamp>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, "update this bootcamp")?;
    input.validate()?;

    let location = match input.address.as_deref() {
        Some(address) => Some(state.geocoder.geocode(address).await?),
        None => None,
    };
    Bootcamp::update(&state.pool, id, &input, location.as_ref()).await?;

    Ok(ApiResponse::success(repo.select_404(id).await?))
}

/// DELETE /api/v1/bootcamps/:id - courses and reviews go with it
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let repo = Repository::<Bootcamp>::new(state.pool.clone());
    let existing = repo.select_404(id).await?;
    ensure_owner(&principal, existing.user, "delete this bootcamp")?;

    repo.delete_404(id).await?;
    tracing::info!("bootcamp {} deleted by {}", id, principal.id);
    Ok(empty())
}
