use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use axum::body::Bytes;
use tokio::io::AsyncWriteExt;

use crate::config::S3Config;
use crate::error::AppError;

/// Where uploaded binaries live. Keys are the records' stored names.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Public URL the binary can be fetched from.
    fn public_url(&self, key: &str) -> String;

    /// Directory served under `/uploads`, if this store is backed by the local disk.
    fn served_dir(&self) -> Option<&Path> {
        None
    }
}

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Builds a stored name from the arrival time in milliseconds plus the original extension.
/// Stamps are strictly increasing within the process, so two uploads in the same
/// millisecond still get distinct names.
pub fn stored_name_for(original_name: &str) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    let stamp = loop {
        let next = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => break next,
            Err(actual) => last = actual,
        }
    };

    match extension(original_name) {
        Some(ext) => format!("{}.{}", stamp, ext),
        None => stamp.to_string(),
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

pub struct LocalBlobStore {
    root: PathBuf,
    base_url: url::Url,
}

impl LocalBlobStore {
    pub async fn new(root: impl Into<PathBuf>, base_url: url::Url) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, base_url })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::Storage(format!("refusing unsafe key '{}'", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}/uploads/{}", base, key)
    }

    fn served_dir(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket_name: String,
    public_base: String,
}

impl S3BlobStore {
    pub fn new(config: &S3Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "manual_config",
        );

        let region = aws_sdk_s3::config::Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket_name: config.bucket_name.clone(),
            public_base: config.public_base_url(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(aws_sdk_s3::types::ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload of {} failed: {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete of {} failed: {}", key, e)))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
