use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use url::Url;

use crate::models::account::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::media::MediaRecord;
use crate::models::MessageResponse;

use super::{ClientError, PreparedFile, Session};

/// The catalog operations the view depends on.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list(&self, session: &Session) -> Result<Vec<MediaRecord>, ClientError>;

    async fn upload(
        &self,
        session: &Session,
        label: &str,
        file: PreparedFile,
    ) -> Result<String, ClientError>;

    async fn edit(
        &self,
        session: &Session,
        id: i32,
        label: &str,
        file: Option<PreparedFile>,
    ) -> Result<String, ClientError>;

    async fn delete(&self, session: &Session, id: i32) -> Result<String, ClientError>;
}

/// HTTP client for the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    http: reqwest::Client,
    base: Url,
}

impl CatalogApi {
    /// `server` is the server root, e.g. `http://localhost:5000`.
    pub fn new(server: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(server)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base: base.join("api/")?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ClientError> {
        let res = self
            .http
            .post(self.endpoint("register")?)
            .json(request)
            .send()
            .await?;
        message_of(res).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let res = self
            .http
            .post(self.endpoint("login")?)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let res = ensure_success(res).await?;
        let body: LoginResponse = res
            .json()
            .await
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))?;

        tracing::info!(user_id = body.user.id, "logged in");
        Ok(Session::from(body))
    }
}

#[async_trait]
impl CatalogBackend for CatalogApi {
    /// Any JSON array of records is accepted whatever the status; the server answers failed
    /// listings with an empty array.
    async fn list(&self, session: &Session) -> Result<Vec<MediaRecord>, ClientError> {
        let res = self
            .http
            .get(self.endpoint("files")?)
            .bearer_auth(session.token().as_str())
            .send()
            .await?;

        let is_json = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let status = res.status();
        let body = res.text().await?;

        if !is_json {
            return Err(ClientError::MalformedPayload(format!(
                "expected JSON, got status {} with {} bytes",
                status,
                body.len()
            )));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::MalformedPayload(e.to_string()))
    }

    async fn upload(
        &self,
        session: &Session,
        label: &str,
        file: PreparedFile,
    ) -> Result<String, ClientError> {
        let kind = file.kind();
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("userId", session.owner_id().to_string())
            .text("fileType", kind.as_str())
            .text("fileName", label.to_string());

        let res = self
            .http
            .post(self.endpoint("upload")?)
            .bearer_auth(session.token().as_str())
            .multipart(form)
            .send()
            .await?;
        message_of(res).await
    }

    async fn edit(
        &self,
        session: &Session,
        id: i32,
        label: &str,
        file: Option<PreparedFile>,
    ) -> Result<String, ClientError> {
        let mut form = Form::new().text("fileName", label.to_string());
        if let Some(file) = file {
            form = form.part("file", file_part(file)?);
        }

        let res = self
            .http
            .put(self.endpoint(&format!("files/{}", id))?)
            .bearer_auth(session.token().as_str())
            .multipart(form)
            .send()
            .await?;
        message_of(res).await
    }

    async fn delete(&self, session: &Session, id: i32) -> Result<String, ClientError> {
        let res = self
            .http
            .delete(self.endpoint(&format!("files/{}", id))?)
            .bearer_auth(session.token().as_str())
            .send()
            .await?;
        message_of(res).await
    }
}

fn file_part(file: PreparedFile) -> Result<Part, ClientError> {
    Ok(Part::bytes(file.data)
        .file_name(file.file_name)
        .mime_str(file.content_type)?)
}

async fn ensure_success(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&body)
        .map(|m| m.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    Err(ClientError::Service { status, message })
}

async fn message_of(res: Response) -> Result<String, ClientError> {
    let res = ensure_success(res).await?;
    let body: MessageResponse = res
        .json()
        .await
        .map_err(|e| ClientError::MalformedPayload(e.to_string()))?;
    Ok(body.message)
}
