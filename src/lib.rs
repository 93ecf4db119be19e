//! # MCP Server for Splunk SOAR
//!
//! This library provides an MCP (Model Context Protocol) server implementation
//! for Splunk SOAR. It allows AI assistants to interact with a SOAR instance
//! through a standardized protocol.
//!
//! ## Features
//!
//! - Test connectivity and read SOAR version and system information
//! - List containers (incidents/cases) and fetch a single container
//! - List playbooks and run a playbook against a container
//! - List actions and check the status of an action run
//! - List configured assets
//!
//! ## Usage
//!
//! The server is typically run as a standalone binary that communicates
//! over stdio with MCP clients. An HTTP transport (`/health`, `/tools`,
//! `/execute`) is available for clients that cannot spawn processes.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod server;
pub mod soar;
pub mod tools;

pub use config::{ConfigError, SoarConfig};
pub use dispatcher::{Dispatcher, InvocationRequest, InvocationResponse};
pub use error::ToolError;
pub use server::SoarToolsServer;
pub use soar::{
    client::{SoarApi, SoarClient, SoarRequest},
    error::SoarApiError,
};
pub use tools::ToolRegistry;
