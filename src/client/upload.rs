use std::path::Path;

use crate::entities::media::MediaKind;

use super::ClientError;

/// Largest file the gallery accepts by default.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// A local file checked and ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl PreparedFile {
    pub async fn read(path: &Path, max_bytes: usize) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation(format!("{} is not a file", path.display())))?
            .to_string();

        let size = tokio::fs::metadata(path).await?.len();
        if size > max_bytes as u64 {
            return Err(too_large(max_bytes));
        }

        let data = tokio::fs::read(path).await?;
        Self::from_bytes(file_name, data, max_bytes)
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        data: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).ok_or_else(|| {
            ClientError::Validation(format!(
                "{} is not a supported photo or video (jpg, jpeg, png, webp, gif, mp4, webm, mov)",
                file_name
            ))
        })?;

        if data.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_content_type(self.content_type)
    }

    /// Everything before the first dot of the file name.
    pub fn default_label(&self) -> String {
        self.file_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

fn too_large(max_bytes: usize) -> ClientError {
    ClientError::Validation(format!(
        "Files may be at most {} MB",
        max_bytes / (1024 * 1024)
    ))
}

pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();

    let content_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(content_type)
}
