use serde_json::{json, Value};
use thiserror::Error;

use crate::soar::error::SoarApiError;

/// Failure of a single tool invocation. None of these stop the server.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("Unexpected parameter(s): {}", .0.join(", "))]
    UnexpectedParameters(Vec<String>),

    #[error("Invalid parameters: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Api(#[from] SoarApiError),

    #[error("Request was cancelled")]
    Cancelled,
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "UnknownToolError",
            ToolError::MissingParameters(_) => "MissingParameterError",
            ToolError::UnexpectedParameters(_) => "UnexpectedParameterError",
            ToolError::InvalidParameter(_) => "InvalidParameterError",
            ToolError::Api(e) => e.kind(),
            ToolError::Cancelled => "CancelledError",
        }
    }

    /// Structured form sent back to the client in an error response.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });

        match self {
            ToolError::UnknownTool(name) => {
                payload["tool"] = json!(name);
            }
            ToolError::MissingParameters(missing) => {
                payload["missing"] = json!(missing);
            }
            ToolError::UnexpectedParameters(unexpected) => {
                payload["unexpected"] = json!(unexpected);
            }
            ToolError::Api(SoarApiError::HttpError { status_code, body }) => {
                payload["status_code"] = json!(status_code);
                payload["body"] = json!(body);
            }
            _ => {}
        }

        payload
    }
}
