use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    Error as McpError, RoleServer, ServerHandler,
};
use std::sync::Arc;

use crate::config::SoarConfig;
use crate::dispatcher::{Dispatcher, InvocationRequest, InvocationResponse};
use crate::soar::client::SoarClient;
use crate::soar::error::SoarApiError;
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub struct SoarToolsServer {
    dispatcher: Arc<Dispatcher>,
}

impl SoarToolsServer {
    pub fn new(config: &SoarConfig) -> Result<Self, SoarApiError> {
        tracing::debug!(?config, "Creating Splunk SOAR client");
        let client = SoarClient::new(config)?;
        Ok(Self::with_dispatcher(Arc::new(Dispatcher::new(
            ToolRegistry::new(),
            Arc::new(client),
        ))))
    }

    pub fn with_dispatcher(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    pub fn tool_list(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .tools()
            .map(|tool| {
                Tool::new(
                    tool.descriptor.name,
                    tool.descriptor.description,
                    tool.input_schema.clone(),
                )
            })
            .collect()
    }
}

/// Renders an invocation outcome as MCP tool content.
///
/// Failures are reported as tool errors (`isError: true`) rather than
/// JSON-RPC errors so the client sees the structured payload.
pub fn to_call_tool_result(response: InvocationResponse) -> CallToolResult {
    let text = serde_json::to_string_pretty(&response.payload)
        .unwrap_or_else(|_| response.payload.to_string());

    if response.success {
        CallToolResult::success(vec![Content::text(text)])
    } else {
        CallToolResult::error(vec![Content::text(text)])
    }
}

impl ServerHandler for SoarToolsServer {
    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tool_list(),
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let invocation =
            InvocationRequest::new(request.name.as_ref(), request.arguments.unwrap_or_default());

        let response = self.dispatcher.dispatch(invocation, &context.ct).await;
        Ok(to_call_tool_result(response))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server provides tools to interact with a Splunk SOAR instance.\n\
                Available tools:\n\
                - 'test_connection': Verifies connectivity and authentication; returns the SOAR version.\n\
                - 'list_containers': Lists containers (incidents/cases). Optional 'page' (default 0) and 'page_size' (default 10).\n\
                - 'get_container': Retrieves one container. Requires 'container_id'.\n\
                - 'list_playbooks': Lists available playbooks.\n\
                - 'run_playbook': Runs a playbook against a container. Requires 'playbook_id' and 'container_id'; optional 'scope' ('all' or 'new').\n\
                - 'list_actions': Lists available actions.\n\
                - 'get_action_run': Retrieves the status and results of an action run. Requires 'action_run_id'.\n\
                - 'list_assets': Lists configured assets.\n\
                - 'get_system_info': Retrieves SOAR system information.\n\
                Results are returned as the JSON document produced by the SOAR REST API."
                    .to_string(),
            ),
        }
    }
}
