use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::error::AppError;
use crate::models::media::MediaRecord;
use crate::models::MessageResponse;
use crate::services::catalog::MediaUpdate;

use super::upload::read_form;
use super::AppState;

// GET /api/files
#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "All media, newest first", body = Vec<MediaRecord>),
        (status = 500, description = "Database failure; body is an empty array", body = Vec<MediaRecord>),
        (status = 503, description = "Database unreachable; body is an empty array", body = Vec<MediaRecord>)
    ),
    tag = "Media"
)]
pub async fn list_files(State(state): State<AppState>) -> Response {
    match state.catalog.list().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            // Clients render an empty gallery instead of an error.
            tracing::error!(error = %e, "GET /api/files failed, answering with an empty list");
            let status = match e.status() {
                StatusCode::SERVICE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(Vec::<MediaRecord>::new())).into_response()
        }
    }
}

// PUT /api/files/:id
#[utoipa::path(
    put,
    path = "/api/files/{id}",
    params(
        ("id" = i32, Path, description = "Media ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Parts: fileName (new label), optional file (replacement binary)"),
    responses(
        (status = 200, description = "Media updated", body = MessageResponse),
        (status = 404, description = "Media not found", body = MessageResponse),
        (status = 413, description = "File exceeds the upload limit", body = MessageResponse),
        (status = 500, description = "Storage or database failure", body = MessageResponse)
    ),
    tag = "Media"
)]
pub async fn update_file(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let form = read_form(multipart).await?;
    let replaced = form.file.is_some();

    state
        .catalog
        .update(
            id,
            MediaUpdate {
                label: form.file_name,
                binary: form.file,
            },
        )
        .await?;

    tracing::info!(id, replaced, "PUT /api/files ok");
    Ok(Json(MessageResponse::new("Media updated")))
}

// DELETE /api/files/:id
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(
        ("id" = i32, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted, or it did not exist", body = MessageResponse),
        (status = 500, description = "Database failure", body = MessageResponse)
    ),
    tag = "Media"
)]
pub async fn delete_file(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.catalog.delete(id).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}
