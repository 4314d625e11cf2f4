use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("failed to reach the server: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{message}")]
    Service { status: StatusCode, message: String },
    /// The response could not be read as the expected payload.
    #[error("unexpected response from the server: {0}")]
    MalformedPayload(String),
    /// Rejected locally before anything was sent.
    #[error("{0}")]
    Validation(String),
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
