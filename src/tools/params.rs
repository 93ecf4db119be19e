use rmcp::{model::JsonObject, schemars};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{render_path, ToolDescriptor, ToolKind};
use crate::error::ToolError;
use crate::soar::client::SoarRequest;

/// `page_size` sent by the catalogue listings (playbooks, actions, assets).
pub const CATALOGUE_PAGE_SIZE: u32 = 100;
pub const DEFAULT_CONTAINER_PAGE_SIZE: u32 = 10;
pub const DEFAULT_PLAYBOOK_SCOPE: &str = "all";

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct NoParams {}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListContainersParams {
    #[schemars(description = "Page number (default: 0)")]
    pub page: Option<u32>,
    #[schemars(description = "Results per page (default: 10)")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetContainerParams {
    #[schemars(description = "Container ID")]
    pub container_id: u64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunPlaybookParams {
    #[schemars(description = "Playbook ID to run")]
    pub playbook_id: u64,
    #[schemars(description = "Container ID to run the playbook on")]
    pub container_id: u64,
    #[schemars(description = "Scope: 'all' or 'new' (default: 'all')")]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetActionRunParams {
    #[schemars(description = "Action run ID")]
    pub action_run_id: u64,
}

/// A validated tool invocation with typed arguments.
#[derive(Debug)]
pub enum ToolCall {
    TestConnection,
    ListContainers(ListContainersParams),
    GetContainer(GetContainerParams),
    ListPlaybooks,
    RunPlaybook(RunPlaybookParams),
    ListActions,
    GetActionRun(GetActionRunParams),
    ListAssets,
    GetSystemInfo,
}

impl ToolCall {
    pub fn parse(kind: ToolKind, arguments: JsonObject) -> Result<Self, ToolError> {
        let args = Value::Object(arguments);
        let call = match kind {
            ToolKind::TestConnection => ToolCall::TestConnection,
            ToolKind::ListContainers => ToolCall::ListContainers(typed(args)?),
            ToolKind::GetContainer => ToolCall::GetContainer(typed(args)?),
            ToolKind::ListPlaybooks => ToolCall::ListPlaybooks,
            ToolKind::RunPlaybook => ToolCall::RunPlaybook(typed(args)?),
            ToolKind::ListActions => ToolCall::ListActions,
            ToolKind::GetActionRun => ToolCall::GetActionRun(typed(args)?),
            ToolKind::ListAssets => ToolCall::ListAssets,
            ToolKind::GetSystemInfo => ToolCall::GetSystemInfo,
        };
        Ok(call)
    }

    /// Builds the outbound request from the descriptor's method and template.
    pub fn into_request(self, descriptor: &ToolDescriptor) -> Result<SoarRequest, ToolError> {
        let method = descriptor.http_method.as_reqwest();
        let template = descriptor.path_template;

        let request = match self {
            ToolCall::TestConnection | ToolCall::GetSystemInfo => {
                SoarRequest::get(render_path(template, &[])?)
            }
            ToolCall::ListContainers(params) => SoarRequest::get(render_path(template, &[])?)
                .with_query("page", params.page.unwrap_or(0))
                .with_query(
                    "page_size",
                    params.page_size.unwrap_or(DEFAULT_CONTAINER_PAGE_SIZE),
                ),
            ToolCall::GetContainer(params) => SoarRequest::get(render_path(
                template,
                &[("container_id", params.container_id.to_string())],
            )?),
            ToolCall::ListPlaybooks | ToolCall::ListActions | ToolCall::ListAssets => {
                SoarRequest::get(render_path(template, &[])?)
                    .with_query("page_size", CATALOGUE_PAGE_SIZE)
            }
            ToolCall::RunPlaybook(params) => {
                let scope = params
                    .scope
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PLAYBOOK_SCOPE.to_string());
                SoarRequest::post(
                    render_path(template, &[])?,
                    json!({
                        "container_id": params.container_id,
                        "playbook_id": params.playbook_id,
                        "scope": scope,
                        "run": true,
                    }),
                )
            }
            ToolCall::GetActionRun(params) => SoarRequest::get(render_path(
                template,
                &[("action_run_id", params.action_run_id.to_string())],
            )?),
        };

        Ok(SoarRequest { method, ..request })
    }
}

fn typed<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidParameter(e.to_string()))
}

fn schema_of<T: schemars::JsonSchema>() -> JsonObject {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut fallback = JsonObject::new();
            fallback.insert("type".to_string(), json!("object"));
            fallback
        }
    }
}

pub fn input_schema(kind: ToolKind) -> JsonObject {
    match kind {
        ToolKind::ListContainers => schema_of::<ListContainersParams>(),
        ToolKind::GetContainer => schema_of::<GetContainerParams>(),
        ToolKind::RunPlaybook => schema_of::<RunPlaybookParams>(),
        ToolKind::GetActionRun => schema_of::<GetActionRunParams>(),
        ToolKind::TestConnection
        | ToolKind::ListPlaybooks
        | ToolKind::ListActions
        | ToolKind::ListAssets
        | ToolKind::GetSystemInfo => schema_of::<NoParams>(),
    }
}
