//! MCP server implementation for docvault.
//!
//! Exposes corpus search, listing and retrieval as MCP tools for AI editors.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::commands::{self, Overrides};
use crate::config::Config;
use crate::format;
use crate::search::SearchError;

/// Parameters for `search_docs` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Keywords to search for")]
    pub query: String,
    #[schemars(description = "Maximum number of results (default: 10)")]
    pub limit: Option<usize>,
    #[schemars(description = "Return JSON records instead of a text report (default: false)")]
    pub json: Option<bool>,
}

/// Parameters for `get_doc` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetParams {
    #[schemars(description = "Document path relative to the corpus root (e.g., 'guide/install.md')")]
    pub path: String,
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(format!("{context}: {e}")),
        data: None,
    }
}

/// Invalid search parameters are the caller's fault; anything else is ours.
fn search_error(e: &anyhow::Error) -> McpError {
    match e.downcast_ref::<SearchError>() {
        Some(err @ SearchError::InvalidMaxResults(_)) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::from(err.to_string()),
            data: None,
        },
        None => internal_error("Search failed", e),
    }
}

/// MCP server exposing docvault tools.
#[derive(Clone)]
pub struct DocvaultServer {
    config: Arc<Config>,
    overrides: Arc<Overrides>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DocvaultServer {
    #[must_use]
    pub fn new(config: Config, overrides: Overrides) -> Self {
        Self {
            config: Arc::new(config),
            overrides: Arc::new(overrides),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Search the documentation corpus for pages matching keywords")]
    async fn search_docs(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = commands::search(&self.config, &self.overrides, &params.query, params.limit)
            .map_err(|e| search_error(&e))?;

        let output = if params.json.unwrap_or(false) {
            format::render_json(&results).map_err(|e| internal_error("Search failed", e))?
        } else {
            format::render_text(&params.query, &results)
        };

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "List all documents in the documentation corpus")]
    async fn list_docs(&self) -> Result<CallToolResult, McpError> {
        let documents = commands::list(&self.config, &self.overrides)
            .map_err(|e| internal_error("List failed", e))?;

        if documents.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                "No documents found.".to_string(),
            )]));
        }

        let mut output = String::new();
        for doc in &documents {
            let _ = writeln!(
                output,
                "- **{}**: `{}`\n  Source: {}",
                doc.title, doc.path, doc.source_url
            );
        }

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    #[tool(description = "Get the full contents of a document by its path")]
    async fn get_doc(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        commands::get(&self.config, &self.overrides, &params.path)
            .map(|content| CallToolResult::success(vec![Content::text(content)]))
            .map_err(|e| internal_error("Failed to get document", e))
    }
}

#[tool_handler]
impl ServerHandler for DocvaultServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "docvault searches a local documentation corpus. \
                Use search_docs to find pages by keyword, list_docs to browse, \
                and get_doc to read a page in full."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(config: Config, overrides: Overrides) -> anyhow::Result<()> {
    let server = DocvaultServer::new(config, overrides);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
