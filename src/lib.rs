//! # Repo Overlap - Shared Code Detection Across Remote Repositories
//!
//! A Rust library and Model Context Protocol (MCP) server that crawls remote
//! repositories, turns their source files into one deterministic corpus per
//! repository, splits it into bounded line-aligned chunks and reports the
//! literal lines two corpora have in common.
//!
//! ## Overview
//!
//! A review batch walks an ordered list of repositories. Each repository is
//! crawled depth-first through the GitHub contents API, its selected files are
//! concatenated in traversal order, and the result is chunked so it fits in
//! downstream storage cells. Every repository is then compared line by line
//! with the previous successfully crawled one.
//!
//! ## Key Features
//!
//! - **Deterministic Corpus**: listing order plus depth-first traversal, with
//!   bounded concurrent fetches reassembled in order
//! - **Lossless Chunking**: chunks end on line breaks and concatenate back to
//!   the exact corpus; over-long lines are force-cut and flagged
//! - **Exact Line Matching**: no normalization, first-seen ordering
//! - **Degraded Crawls**: failing subdirectories and files become diagnostics
//! - **MCP Protocol**: 3 tools for AI assistant integration
//!
//! ## Architecture
//!
//! ```text
//!   OverlapMcpServer / CLI
//!            |
//!      OverlapClient
//!            |
//!    BatchOrchestrator ----------------.
//!            |                          |
//!       TreeCrawler --> CorpusChunker --> common_lines
//!            |
//!   RepositorySource (GithubSource, MemorySource)
//! ```
//!
//! ## Modules
//!
//! - [`source`]: Remote repository capabilities and listing types
//! - [`crawler`]: Depth-first tree crawl with path filtering
//! - [`corpus`]: Corpus text and builder
//! - [`chunker`]: Line-aligned bounded chunking
//! - [`similarity`]: Common-line detection
//! - [`batch`]: Sequential batch review with explicit state
//! - [`client`]: Library facade
//! - [`mcp_server`]: MCP protocol server implementation with tools
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: MCP request/response types with JSON schema
//! - [`error`]: Error types
//! - [`paths`]: Platform configuration paths
//!
//! ## Usage Example
//!
//! ```no_run
//! use repo_overlap::mcp_server::OverlapMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Serve over stdio (MCP protocol) with configuration from disk and environment
//!     OverlapMcpServer::serve_stdio().await?;
//!
//!     Ok(())
//! }
//! ```

/// Sequential batch review of repository tasks
pub mod batch;

/// Line-aligned, bounded-size chunking
pub mod chunker;

/// Library client facade
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Corpus text assembled from crawled files
pub mod corpus;

/// Depth-first repository crawl
pub mod crawler;

/// Error types and utilities
pub mod error;

/// MCP server implementation with tools
pub mod mcp_server;

/// Platform configuration paths
pub mod paths;

/// Common-line detection between chunk sequences
pub mod similarity;

/// Remote repository sources
pub mod source;

/// MCP request/response types with JSON schema definitions
pub mod types;

pub use batch::{BatchOrchestrator, BatchReport, BatchState, ReviewTask, TaskOutcome, TaskReport};
pub use chunker::{Chunk, CorpusChunker, chunk, reassemble};
pub use client::OverlapClient;
pub use config::Config;
pub use corpus::CodeCorpus;
pub use crawler::{CrawlOutcome, TreeCrawler};
pub use error::OverlapError;
pub use similarity::common_lines;
pub use source::{GithubSource, MemorySource, MemoryTree, RepositoryRef, RepositorySource};
pub use types::{BatchRequest, CrawlRequest, CrawlResponse, DiffRequest, DiffResponse};
