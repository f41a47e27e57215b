use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http call resulted in error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid base url {0}: {1}")]
    InvalidBaseUrl(String, url::ParseError),
    #[error("base url {0} cannot carry a path")]
    UnusableBaseUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}
