use crate::client::OverlapClient;
use crate::source::RepositoryRef;
use crate::types::*;

use anyhow::{Context, Result};
use rmcp::{
    RoleServer, ServerHandler, ServiceExt,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct OverlapMcpServer {
    client: Arc<OverlapClient>,
    tool_router: ToolRouter<Self>,
}

impl OverlapMcpServer {
    /// Create a new MCP server with default configuration
    pub fn new() -> Result<Self> {
        let client = OverlapClient::new()?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create a new MCP server with an existing client
    pub fn with_client(client: Arc<OverlapClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Get the underlying client
    pub fn client(&self) -> &OverlapClient {
        &self.client
    }

    async fn handle_crawl(
        &self,
        req: CrawlRequest,
        cancel_token: &CancellationToken,
    ) -> Result<String, String> {
        req.validate()?;

        let repository: RepositoryRef = req.repository.parse().map_err(|e| format!("{}", e))?;

        let response = self
            .client
            .crawl_and_chunk(&repository, req.bound_size, cancel_token)
            .await
            .map_err(|e| e.to_user_string())?;

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    async fn handle_batch(
        &self,
        req: BatchRequest,
        cancel_token: &CancellationToken,
    ) -> Result<String, String> {
        req.validate()?;

        let response: BatchResponse = self
            .client
            .run_batch(req, cancel_token)
            .await
            .map_err(|e| e.to_user_string())?;

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }
}

#[tool_router(router = tool_router)]
impl OverlapMcpServer {
    #[tool(
        description = "Crawl a GitHub repository depth-first, concatenate its source files into one corpus and split it into line-aligned chunks of at most bound_size characters plus a closing line break."
    )]
    async fn crawl_and_chunk(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(req): Parameters<CrawlRequest>,
    ) -> Result<String, String> {
        self.handle_crawl(req, &context.ct).await
    }

    #[tool(
        description = "Find the distinct lines that occur verbatim in both of two chunk sequences, ordered by first appearance in chunks_b."
    )]
    async fn diff_chunks(
        &self,
        Parameters(req): Parameters<DiffRequest>,
    ) -> Result<String, String> {
        let response = self.client.diff_cells(req);

        serde_json::to_string_pretty(&response).map_err(|e| format!("Serialization failed: {}", e))
    }

    #[tool(
        description = "Review an ordered list of repositories: crawl and chunk each one and report the lines it shares with the previous successfully crawled task. A failing task does not stop the batch."
    )]
    async fn run_batch(
        &self,
        context: RequestContext<RoleServer>,
        Parameters(req): Parameters<BatchRequest>,
    ) -> Result<String, String> {
        self.handle_batch(req, &context.ct).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for OverlapMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "repo-overlap".into(),
                title: Some("Repo Overlap - Shared Code Detection Across Repositories".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Crawl remote repositories into chunked corpora and detect shared lines. \
                Use crawl_and_chunk for one repository, diff_chunks to compare stored chunks, \
                and run_batch to compare each repository of a list with its predecessor."
                    .into(),
            ),
        }
    }
}

impl OverlapMcpServer {
    pub async fn serve_stdio() -> Result<()> {
        let server = Self::new().context("Failed to create MCP server")?;
        server.serve_on_stdio().await
    }

    /// Serve this server instance over stdio until the peer disconnects
    pub async fn serve_on_stdio(self) -> Result<()> {
        tracing::info!("Starting repo-overlap MCP server");

        let transport = rmcp::transport::io::stdio();

        self.serve(transport).await?.waiting().await?;

        Ok(())
    }
}
