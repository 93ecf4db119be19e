//! The fixed set of SOAR tools exposed over MCP.
//!
//! Every tool is described by a static [`ToolDescriptor`]. The
//! [`ToolRegistry`] indexes them by name and carries the JSON Schema that
//! MCP clients see for each tool's arguments.

pub mod params;

use rmcp::model::JsonObject;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ToolError;
pub use params::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    TestConnection,
    ListContainers,
    GetContainer,
    ListPlaybooks,
    RunPlaybook,
    ListActions,
    GetActionRun,
    ListAssets,
    GetSystemInfo,
}

#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
    pub http_method: HttpMethod,
    /// Path under `<base>/rest`; `{name}` segments are filled from arguments.
    pub path_template: &'static str,
    pub required_params: &'static [&'static str],
    pub optional_params: &'static [&'static str],
}

impl ToolDescriptor {
    pub fn accepts(&self, param: &str) -> bool {
        self.required_params.contains(&param) || self.optional_params.contains(&param)
    }

    /// Checks argument names against the descriptor. Missing keys are
    /// reported before unexpected ones, each in a stable order.
    pub fn check_arguments(&self, arguments: &JsonObject) -> Result<(), ToolError> {
        let missing: Vec<String> = self
            .required_params
            .iter()
            .filter(|name| matches!(arguments.get(**name), None | Some(serde_json::Value::Null)))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingParameters(missing));
        }

        let mut unexpected: Vec<String> = arguments
            .keys()
            .filter(|key| !self.accepts(key))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            unexpected.sort();
            return Err(ToolError::UnexpectedParameters(unexpected));
        }

        Ok(())
    }
}

pub static TOOL_DESCRIPTORS: [ToolDescriptor; 9] = [
    ToolDescriptor {
        name: "test_connection",
        description: "Test the connection to the Splunk SOAR instance. Returns the SOAR version information.",
        kind: ToolKind::TestConnection,
        http_method: HttpMethod::Get,
        path_template: "/version",
        required_params: &[],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "list_containers",
        description: "List containers (incidents/cases) in Splunk SOAR. Supports 'page' (default 0) and 'page_size' (default 10).",
        kind: ToolKind::ListContainers,
        http_method: HttpMethod::Get,
        path_template: "/container",
        required_params: &[],
        optional_params: &["page", "page_size"],
    },
    ToolDescriptor {
        name: "get_container",
        description: "Get details of a specific container by its ID.",
        kind: ToolKind::GetContainer,
        http_method: HttpMethod::Get,
        path_template: "/container/{container_id}",
        required_params: &["container_id"],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "list_playbooks",
        description: "List available playbooks in Splunk SOAR.",
        kind: ToolKind::ListPlaybooks,
        http_method: HttpMethod::Get,
        path_template: "/playbook",
        required_params: &[],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "run_playbook",
        description: "Run a playbook on a container. Requires 'playbook_id' and 'container_id'; 'scope' is 'all' (default) or 'new'.",
        kind: ToolKind::RunPlaybook,
        http_method: HttpMethod::Post,
        path_template: "/playbook_run",
        required_params: &["playbook_id", "container_id"],
        optional_params: &["scope"],
    },
    ToolDescriptor {
        name: "list_actions",
        description: "List available actions in Splunk SOAR.",
        kind: ToolKind::ListActions,
        http_method: HttpMethod::Get,
        path_template: "/action",
        required_params: &[],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "get_action_run",
        description: "Get the status and results of an action run by its ID.",
        kind: ToolKind::GetActionRun,
        http_method: HttpMethod::Get,
        path_template: "/action_run/{action_run_id}",
        required_params: &["action_run_id"],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "list_assets",
        description: "List configured assets in Splunk SOAR.",
        kind: ToolKind::ListAssets,
        http_method: HttpMethod::Get,
        path_template: "/asset",
        required_params: &[],
        optional_params: &[],
    },
    ToolDescriptor {
        name: "get_system_info",
        description: "Get Splunk SOAR system information.",
        kind: ToolKind::GetSystemInfo,
        http_method: HttpMethod::Get,
        path_template: "/system_info",
        required_params: &[],
        optional_params: &[],
    },
];

#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub descriptor: &'static ToolDescriptor,
    pub input_schema: Arc<JsonObject>,
}

/// Read-only lookup table from tool name to descriptor.
///
/// Nothing mutates it after [`ToolRegistry::new`], so it can be shared
/// freely between concurrent calls.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let tools: Vec<RegisteredTool> = TOOL_DESCRIPTORS
            .iter()
            .map(|descriptor| RegisteredTool {
                descriptor,
                input_schema: Arc::new(params::input_schema(descriptor.kind)),
            })
            .collect();

        let by_name = tools
            .iter()
            .enumerate()
            .map(|(index, tool)| (tool.descriptor.name, index))
            .collect();

        Self { tools, by_name }
    }

    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    /// All tools in table order.
    pub fn tools(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitutes `{name}` placeholders in a path template.
pub fn render_path(template: &str, values: &[(&str, String)]) -> Result<String, ToolError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            ToolError::InvalidParameter(format!("unterminated placeholder in '{template}'"))
        })?;
        let name = &after[..end];

        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| ToolError::MissingParameters(vec![name.to_string()]))?;
        rendered.push_str(value);

        rest = &after[end + 1..];
    }
    rendered.push_str(rest);

    Ok(rendered)
}
