use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::media::{self, MediaKind};

/// A catalog entry as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: i32,
    pub user_id: i32,
    /// Stored name of the binary.
    pub file_name: String,
    /// Optional human title.
    pub file_label: Option<String>,
    pub file_type: MediaKind,
    pub file_size: i64,
    pub upload_date: NaiveDateTime,
    /// Derived from the storage backend on every read, never persisted.
    pub file_path: String,
}

impl MediaRecord {
    pub fn from_model(model: media::Model, file_path: String) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            file_name: model.file_name,
            file_label: model.file_label,
            file_type: model.file_type,
            file_size: model.file_size,
            upload_date: model.upload_date,
            file_path,
        }
    }

    /// The label when one is set, the stored name otherwise.
    pub fn title(&self) -> &str {
        match self.file_label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.file_name,
        }
    }

    pub fn display_size(&self) -> String {
        format_size(self.file_size)
    }

    pub fn display_date(&self) -> String {
        self.upload_date.format("%-d/%-m/%Y").to_string()
    }
}

/// Human-readable size in base 1024 with at most two decimals, e.g. `1.5 KB`.
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes <= 0 {
        return "0 Bytes".to_string();
    }

    let bytes = bytes as f64;
    let exp = ((bytes.ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes / 1024f64.powi(exp as i32);
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exp])
}
