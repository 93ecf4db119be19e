//! Transport-independent tool dispatch.
//!
//! Both the MCP stdio server and the HTTP transport funnel every call
//! through [`Dispatcher::dispatch`], which resolves the tool, validates the
//! arguments, performs the SOAR call and folds the outcome into an
//! [`InvocationResponse`]. Per-call failures never escape as `Err`.

use rmcp::model::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::soar::client::{SoarApi, SoarRequest};
use crate::tools::{ToolCall, ToolRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "tool")]
    pub tool_name: String,
    #[serde(default)]
    pub arguments: JsonObject,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    pub success: bool,
    pub payload: Value,
}

impl InvocationResponse {
    pub fn error_kind(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            self.payload.get("error").and_then(Value::as_str)
        }
    }
}

impl From<Result<Value, ToolError>> for InvocationResponse {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self {
                success: true,
                payload,
            },
            Err(e) => Self {
                success: false,
                payload: e.to_payload(),
            },
        }
    }
}

pub struct Dispatcher {
    registry: ToolRegistry,
    api: Arc<dyn SoarApi>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, api: Arc<dyn SoarApi>) -> Self {
        Self { registry, api }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolves and validates an invocation without touching the network.
    pub fn prepare(&self, request: InvocationRequest) -> Result<SoarRequest, ToolError> {
        let tool = self
            .registry
            .resolve(&request.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(request.tool_name.clone()))?;
        let descriptor = tool.descriptor;

        descriptor.check_arguments(&request.arguments)?;
        ToolCall::parse(descriptor.kind, request.arguments)?.into_request(descriptor)
    }

    pub async fn execute(
        &self,
        request: InvocationRequest,
        ct: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let soar_request = self.prepare(request)?;

        tokio::select! {
            _ = ct.cancelled() => Err(ToolError::Cancelled),
            result = self.api.call(soar_request) => Ok(result?),
        }
    }

    pub async fn dispatch(
        &self,
        request: InvocationRequest,
        ct: &CancellationToken,
    ) -> InvocationResponse {
        let tool_name = request.tool_name.clone();
        tracing::info!(tool = %tool_name, "Dispatching tool call");

        let result = self.execute(request, ct).await;
        match &result {
            Ok(_) => tracing::info!(tool = %tool_name, "Tool call succeeded"),
            Err(ToolError::Cancelled) => {
                tracing::warn!(tool = %tool_name, "Tool call cancelled by client")
            }
            Err(e) => tracing::error!(tool = %tool_name, kind = e.kind(), "Tool call failed: {}", e),
        }

        InvocationResponse::from(result)
    }
}
