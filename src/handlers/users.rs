// handlers/users.rs - /api/v1/users admin CRUD
use axum::extract::{Query, State};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::database::models::{user, NewUser, User, UserUpdate};
use crate::database::Repository;
use crate::filter::{Filter, QueryParams};
use crate::middleware::{empty, ApiJson, ApiPath, ApiResponse, ApiResult, ListResponse};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<ListResponse> {
    let filter = Filter::from_query(user::SCHEMA, &params, &state.config.query)?;
    let results = Repository::<User>::new(state.pool.clone())
        .select_paged(filter)
        .await?;
    Ok(results.into())
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<User>> {
    let user = Repository::<User>::new(state.pool.clone())
        .select_404(id)
        .await?;
    Ok(ApiResponse::success(user))
}

/// Admins may create users of any role, admin included
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<ApiResponse<User>> {
    input.validate(true)?;
    let hash = hash_password(input.password.as_deref().unwrap_or_default())?;
    let id = User::insert(&state.pool, &input, &hash).await?;

    let user = Repository::<User>::new(state.pool.clone())
        .select_404(id)
        .await?;
    tracing::info!("user {} created with role {}", user.id, user.role.as_str());
    Ok(ApiResponse::created(user))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UserUpdate>,
) -> ApiResult<ApiResponse<User>> {
    let repo = Repository::<User>::new(state.pool.clone());
    repo.select_404(id).await?;
    input.validate()?;

    User::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success(repo.select_404(id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    Repository::<User>::new(state.pool.clone())
        .delete_404(id)
        .await?;
    tracing::info!("user {} deleted", id);
    Ok(empty())
}
