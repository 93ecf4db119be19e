use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoarApiError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClientCreationError(reqwest::Error),

    #[error("SOAR API error {status_code}: {body}")]
    HttpError { status_code: u16, body: String },

    #[error("Connection error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0} seconds")]
    TimeoutError(u64),

    #[error("Invalid JSON in SOAR response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl SoarApiError {
    /// Stable name of the error kind, as reported to MCP clients.
    pub fn kind(&self) -> &'static str {
        match self {
            SoarApiError::HttpClientCreationError(_) | SoarApiError::NetworkError(_) => {
                "NetworkError"
            }
            SoarApiError::HttpError { .. } => "HttpError",
            SoarApiError::TimeoutError(_) => "TimeoutError",
            SoarApiError::InvalidResponse(_) => "InvalidResponseError",
        }
    }
}
