//! Plain HTTP transport for assistants that cannot speak MCP over stdio.
//!
//! Routes:
//! - `GET /health`  liveness probe
//! - `GET /tools`   tool names, descriptions and input schemas
//! - `POST /execute` `{"tool": ..., "arguments": {...}}` → invocation response

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::dispatcher::{Dispatcher, InvocationRequest, InvocationResponse};

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/execute", post(execute))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn list_tools(State(dispatcher): State<Arc<Dispatcher>>) -> Json<Value> {
    let tools: Vec<Value> = dispatcher
        .registry()
        .tools()
        .map(|tool| {
            json!({
                "name": tool.descriptor.name,
                "description": tool.descriptor.description,
                "inputSchema": tool.input_schema.as_ref(),
            })
        })
        .collect();

    Json(json!({ "tools": tools }))
}

async fn execute(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<InvocationRequest>,
) -> Json<InvocationResponse> {
    // A disconnecting client drops this future, which aborts the SOAR call.
    Json(dispatcher.dispatch(request, &CancellationToken::new()).await)
}

pub async fn serve(dispatcher: Arc<Dispatcher>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP transport listening");
    serve_on(listener, dispatcher).await
}

pub async fn serve_on(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, stopping HTTP transport");
        })
        .await?;
    Ok(())
}
