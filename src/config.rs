use std::env;
use std::path::PathBuf;

use url::Url;

const DEFAULT_MAX_UPLOAD_MB: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local,
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2). Path-style addressing is used when set.
    pub endpoint: Option<String>,
}

impl S3Config {
    pub fn public_base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket_name),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket_name, self.region),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Base the `filePath` of every record is built from.
    pub public_base_url: Url,
    pub upload_dir: PathBuf,
    pub storage: StorageBackend,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let public_base_url = Url::parse(&public_base_url).map_err(|e| ConfigError::Invalid {
            name: "PUBLIC_BASE_URL",
            reason: e.to_string(),
        })?;

        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()));

        let max_upload_bytes = upload_limit_bytes(env::var("MAX_UPLOAD_MB").ok().as_deref())?;

        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("s3") => StorageBackend::S3(S3Config {
                bucket_name: required("S3_BUCKET_NAME")?,
                region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                endpoint: env::var("S3_ENDPOINT").ok(),
            }),
            Ok("local") | Err(_) => StorageBackend::Local,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    reason: format!("unknown backend '{}', expected 'local' or 's3'", other),
                })
            }
        };

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            upload_dir,
            storage,
            max_upload_bytes,
        })
    }

    /// Configuration for a local-storage instance; used by tests and the dev setup.
    pub fn local(database_url: impl Into<String>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: "127.0.0.1:0".to_string(),
            public_base_url: Url::parse("http://localhost:5000").expect("static url"),
            upload_dir: upload_dir.into(),
            storage: StorageBackend::Local,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

/// Converts `MAX_UPLOAD_MB` to bytes, falling back to the default when unset.
fn upload_limit_bytes(raw: Option<&str>) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "MAX_UPLOAD_MB",
        reason,
    };

    let megabytes = match raw {
        Some(raw) => raw.trim().parse::<usize>().map_err(|e| invalid(e.to_string()))?,
        None => DEFAULT_MAX_UPLOAD_MB,
    };

    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| invalid(format!("{} MB is too large", megabytes)))
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}
