// handlers/bootcamps/photo.rs - PUT /api/v1/bootcamps/:id/photo
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use uuid::Uuid;

use crate::auth::{ensure_owner, Principal};
use crate::database::models::Bootcamp;
use crate::database::Repository;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::services::uploads::{self, UploadError};
use crate::state::AppState;

/// Store an image as `photo_<id><ext>` and record the file name on the bootcamp.
/// Everything is validated before the file is written or the row touched.
pub async fn upload(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<String>> {
    let bootcamp = Repository::<Bootcamp>::new(state.pool.clone())
        .select_404(id)
        .await?;
    ensure_owner(&principal, bootcamp.user, "update this bootcamp")?;

    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("photo upload without multipart body: {}", rejection);
        UploadError::NoFile
    })?;
    let photo = uploads::read_photo(&mut multipart, state.config.upload.max_file_size).await?;

    let file_name = uploads::photo_file_name(id, photo.original_name.as_deref());
    uploads::store(&state.config.upload.dir, &file_name, &photo.bytes).await?;
    Bootcamp::set_photo(&state.pool, id, &file_name).await?;

    tracing::info!("bootcamp {} photo set to {} ({})", id, file_name, photo.content_type);
    Ok(ApiResponse::success(file_name))
}
