use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Audit failed: {0}")]
    AuditFailure(String),

    #[error("Malformed final URL in report: {0}")]
    MalformedBaseUrl(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Every request-level failure surfaces as a 500; there are no partial responses.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
