use std::sync::Arc;

use axum::body::Bytes;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::media::{self, MediaKind};
use crate::error::AppError;
use crate::models::media::MediaRecord;
use crate::services::storage::{stored_name_for, BlobStore};

/// A binary as it arrives from a multipart upload.
#[derive(Debug, Clone)]
pub struct IncomingBinary {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct NewMedia {
    pub owner_id: i32,
    pub binary: Option<IncomingBinary>,
    pub declared_kind: Option<MediaKind>,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MediaUpdate {
    pub label: Option<String>,
    pub binary: Option<IncomingBinary>,
}

/// Authoritative store of media records and their binaries.
#[derive(Clone)]
pub struct MediaCatalog {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
}

impl MediaCatalog {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>) -> Self {
        Self { db, store }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<MediaRecord>, AppError> {
        let rows = media::Entity::find()
            .order_by_desc(media::Column::UploadDate)
            .order_by_desc(media::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| self.to_record(row)).collect())
    }

    pub async fn create(&self, new: NewMedia) -> Result<MediaRecord, AppError> {
        let binary = new
            .binary
            .ok_or_else(|| AppError::Validation("No file was uploaded".to_string()))?;
        let kind = new
            .declared_kind
            .unwrap_or_else(|| MediaKind::from_content_type(&binary.content_type));

        let stored_name = self.put_binary(&binary).await?;

        let row = media::ActiveModel {
            user_id: Set(new.owner_id),
            file_name: Set(stored_name.clone()),
            file_label: Set(normalize_label(new.label)),
            file_type: Set(kind),
            file_size: Set(binary.data.len() as i64),
            upload_date: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        match row.insert(&self.db).await {
            Ok(saved) => {
                tracing::info!(id = saved.id, stored_name = %saved.file_name, kind = %saved.file_type, size = saved.file_size, "media created");
                Ok(self.to_record(saved))
            }
            Err(e) => {
                self.discard_binary(&stored_name).await;
                Err(e.into())
            }
        }
    }

    /// Renames a record, and replaces its binary when one is given. The upload date never changes.
    pub async fn update(&self, id: i32, update: MediaUpdate) -> Result<MediaRecord, AppError> {
        let label = normalize_label(update.label);

        let Some(binary) = update.binary else {
            let mut active = self.find(id).await?.into_active_model();
            active.file_label = Set(label);
            let saved = active.update(&self.db).await.map_err(not_found_if_gone)?;
            tracing::info!(id, "media renamed");
            return Ok(self.to_record(saved));
        };

        let stored_name = self.put_binary(&binary).await?;
        match self.swap_binary(id, label, &binary, &stored_name).await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.discard_binary(&stored_name).await;
                Err(e)
            }
        }
    }

    /// Points the record at `stored_name` and removes the binary it referenced before. The write
    /// only matches while the row still names the binary that was read; after a concurrent
    /// replace it is retried against the newer row.
    async fn swap_binary(
        &self,
        id: i32,
        label: Option<String>,
        binary: &IncomingBinary,
        stored_name: &str,
    ) -> Result<MediaRecord, AppError> {
        let kind = MediaKind::from_content_type(&binary.content_type);
        let size = binary.data.len() as i64;

        loop {
            let existing = self.find(id).await?;

            let changes = media::ActiveModel {
                file_name: Set(stored_name.to_string()),
                file_label: Set(label.clone()),
                file_type: Set(kind),
                file_size: Set(size),
                ..Default::default()
            };
            let res = media::Entity::update_many()
                .set(changes)
                .filter(media::Column::Id.eq(id))
                .filter(media::Column::FileName.eq(existing.file_name.as_str()))
                .exec(&self.db)
                .await?;

            if res.rows_affected == 0 {
                tracing::debug!(id, "media changed during replace, retrying");
                continue;
            }

            tracing::info!(id, stored_name, previous = %existing.file_name, "media replaced");
            self.discard_binary(&existing.file_name).await;

            return Ok(self.to_record(media::Model {
                file_name: stored_name.to_string(),
                file_label: label,
                file_type: kind,
                file_size: size,
                ..existing
            }));
        }
    }

    /// Removes the record and its binary. Unknown ids are not an error.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let Some(existing) = media::Entity::find_by_id(id).one(&self.db).await? else {
            tracing::debug!(id, "delete of unknown media ignored");
            return Ok(());
        };

        let res = media::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected > 0 {
            tracing::info!(id, stored_name = %existing.file_name, "media deleted");
            self.discard_binary(&existing.file_name).await;
        }

        Ok(())
    }

    async fn find(&self, id: i32) -> Result<media::Model, AppError> {
        media::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }

    async fn put_binary(&self, binary: &IncomingBinary) -> Result<String, AppError> {
        let stored_name = stored_name_for(&binary.original_name);
        self.store
            .put(&stored_name, binary.data.clone(), &binary.content_type)
            .await?;
        Ok(stored_name)
    }

    async fn discard_binary(&self, stored_name: &str) {
        if let Err(e) = self.store.delete(stored_name).await {
            tracing::warn!(stored_name, error = %e, "failed to remove binary");
        }
    }

    fn to_record(&self, model: media::Model) -> MediaRecord {
        let path = self.store.public_url(&model.file_name);
        MediaRecord::from_model(model, path)
    }
}

fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

// The row vanished between the lookup and the write.
fn not_found_if_gone(err: sea_orm::DbErr) -> AppError {
    match err {
        sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Media not found".to_string()),
        other => other.into(),
    }
}
