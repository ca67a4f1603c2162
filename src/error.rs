use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    /// Rejected before any state mutation; always surfaced synchronously
    /// to the caller that issued the action.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    /// Non-2xx response that does not map to a permission or lookup
    /// failure; carries whatever the server said.
    #[error("remote error: {0}")]
    Remote(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Map a response status to the local taxonomy. 2xx maps to `None`.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Option<Self> {
        use reqwest::StatusCode;
        match status {
            s if s.is_success() => None,
            StatusCode::UNAUTHORIZED => Some(AppError::Unauthorized),
            StatusCode::FORBIDDEN => Some(AppError::Forbidden),
            StatusCode::NOT_FOUND => Some(AppError::NotFound),
            s => Some(AppError::Remote(format!("{s}: {body}"))),
        }
    }
}
