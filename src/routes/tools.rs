// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tool routes.
//! The bearer-token middleware is applied in routes/mod.rs for these routes.

use crate::error::{AppError, Result};
use crate::models::ToolResponse;
use crate::services::tools::{descriptors, ToolArgs, ToolDescriptor, ToolName};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
}

#[derive(Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDescriptor>,
}

async fn list_tools() -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: descriptors(),
    })
}

/// Invoke a tool. The body is optional; an empty body means default arguments.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>> {
    let tool: ToolName = name.parse()?;
    let args = parse_args(&body)?;

    let response = state.tools.invoke(tool, &args).await?;
    Ok(Json(response))
}

fn parse_args(body: &[u8]) -> Result<ToolArgs> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ToolArgs::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidArgument(format!("Malformed tool arguments: {}", e)))
}
