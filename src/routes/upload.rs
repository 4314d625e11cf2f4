use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::media::MediaKind;
use crate::error::AppError;
use crate::models::MessageResponse;
use crate::services::catalog::{IncomingBinary, NewMedia};

use super::AppState;

/// Fields of the upload and edit forms. Parts may arrive in any order.
#[derive(Debug, Default)]
pub(super) struct MediaForm {
    pub file: Option<IncomingBinary>,
    pub user_id: Option<String>,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File is too large".to_string())
    } else {
        AppError::Validation(format!("{}: {}", context, err))
    }
}

pub(super) async fn read_form(mut multipart: Multipart) -> Result<MediaForm, AppError> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart data", e))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let original_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file", e))?;
                // An empty file input still posts a part with no filename and no bytes.
                if data.is_empty() && original_name.is_none() {
                    continue;
                }
                form.file = Some(IncomingBinary {
                    original_name: original_name.unwrap_or_else(|| "upload".to_string()),
                    content_type,
                    data,
                });
            }
            "userId" | "fileType" | "fileName" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form field {}: {}", name, e)))?;
                match name.as_str() {
                    "userId" => form.user_id = Some(value),
                    "fileType" => form.file_type = Some(value),
                    _ => form.file_name = Some(value),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Media",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Parts: file, userId, fileType (image|video), fileName (label)"),
    responses(
        (status = 200, description = "Media uploaded", body = MessageResponse),
        (status = 400, description = "Missing file or invalid fields", body = MessageResponse),
        (status = 413, description = "File exceeds the upload limit", body = MessageResponse),
        (status = 500, description = "Storage or database failure", body = MessageResponse)
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let form = read_form(multipart).await?;

    if form.file.is_none() {
        tracing::info!("POST /api/upload rejected: no file part");
        return Err(AppError::Validation("No file was uploaded".to_string()));
    }

    let owner_id = form
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?
        .parse::<i32>()
        .map_err(|_| AppError::Validation("userId must be a number".to_string()))?;

    let declared_kind = match form.file_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(MediaKind::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Unknown fileType '{}', expected image or video", raw))
        })?),
    };

    let record = state
        .catalog
        .create(NewMedia {
            owner_id,
            binary: form.file,
            declared_kind,
            label: form.file_name,
        })
        .await?;

    tracing::info!(id = record.id, owner_id, "POST /api/upload ok");
    Ok(Json(MessageResponse::new("Upload succeeded")))
}
