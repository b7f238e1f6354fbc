//! Core library client for repo-overlap
//!
//! This module provides the main client interface for using repo-overlap
//! as a library in your own Rust applications.

use crate::batch::{BatchOrchestrator, BatchReport};
use crate::chunker::{Chunk, CorpusChunker};
use crate::config::Config;
use crate::crawler::TreeCrawler;
use crate::error::OverlapError;
use crate::similarity::common_lines;
use crate::source::{GithubSource, RepositoryRef, RepositorySource};
use crate::types::*;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Main client for crawling repositories and comparing their corpora
///
/// The client owns the configuration and the remote source. Every operation
/// builds its crawler and chunker from them, so one client can serve any
/// number of concurrent requests.
///
/// # Example
///
/// ```no_run
/// use repo_overlap::{OverlapClient, RepositoryRef};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = OverlapClient::new()?;
///
///     let repo: RepositoryRef = "rust-lang/mdBook".parse()?;
///     let response = client
///         .crawl_and_chunk(&repo, None, &CancellationToken::new())
///         .await?;
///     println!("{} characters in {} chunks", response.corpus_length, response.chunks.len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct OverlapClient {
    pub(crate) config: Arc<Config>,
    pub(crate) source: Arc<dyn RepositorySource>,
}

impl OverlapClient {
    /// Create a client from the configuration file and environment
    pub fn new() -> Result<Self> {
        let config = Config::new().context("Failed to load configuration")?;
        Self::with_config(config)
    }

    /// Create a client that reads repositories through the GitHub API
    pub fn with_config(config: Config) -> Result<Self> {
        tracing::info!("Initializing overlap client with configuration");
        tracing::debug!("GitHub API: {}", config.github.api_url);
        tracing::debug!("Extensions: {:?}", config.crawl.extensions);
        tracing::debug!("Bound size: {}", config.chunking.bound_size);

        config.validate().context("Invalid configuration")?;
        let source =
            GithubSource::new(&config.github).context("Failed to initialize GitHub source")?;

        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create a client over any repository source
    pub fn with_source(config: Config, source: Arc<dyn RepositorySource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chunker for a request, falling back to the configured bound
    fn chunker(&self, bound_size: Option<usize>) -> Result<CorpusChunker, OverlapError> {
        let bound_size = bound_size.unwrap_or(self.config.chunking.bound_size);
        Ok(CorpusChunker::new(bound_size)?)
    }

    fn crawler(&self) -> Result<TreeCrawler, OverlapError> {
        Ok(TreeCrawler::new(self.source.clone(), &self.config.crawl)?)
    }

    /// Crawl a repository and chunk its corpus
    ///
    /// An invalid bound size is rejected before any remote call is made.
    pub async fn crawl_and_chunk(
        &self,
        repository: &RepositoryRef,
        bound_size: Option<usize>,
        cancel_token: &CancellationToken,
    ) -> Result<CrawlResponse, OverlapError> {
        let start = Instant::now();
        let chunker = self.chunker(bound_size)?;
        let outcome = self.crawler()?.crawl(repository, cancel_token).await?;
        let chunks = chunker.chunk(outcome.corpus.as_str());

        tracing::info!(
            "Chunked {} into {} chunks (bound {})",
            repository,
            chunks.len(),
            chunker.bound_size()
        );

        Ok(CrawlResponse {
            repository: repository.to_string(),
            corpus_length: outcome.corpus.len(),
            corpus_fingerprint: outcome.corpus.fingerprint(),
            files_included: outcome.files_included,
            files_skipped: outcome.files_skipped,
            directories_visited: outcome.directories_visited,
            chunks,
            diagnostics: outcome.diagnostics,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Lines shared by two chunk sequences, ordered by first appearance in `chunks_b`
    pub fn diff(&self, chunks_a: &[Chunk], chunks_b: &[Chunk]) -> Vec<String> {
        common_lines(chunks_a, chunks_b)
    }

    /// Diff two sequences of stored chunk texts
    pub fn diff_cells(&self, req: DiffRequest) -> DiffResponse {
        let common_lines = self.diff(&cells_to_chunks(req.chunks_a), &cells_to_chunks(req.chunks_b));
        DiffResponse {
            count: common_lines.len(),
            common_lines,
        }
    }

    /// Review every task in order, comparing each with the last successful one
    ///
    /// An invalid bound size or crawl configuration fails the whole batch
    /// before any task starts. After that, failures are reported per task.
    pub async fn run_batch(
        &self,
        req: BatchRequest,
        cancel_token: &CancellationToken,
    ) -> Result<BatchReport, OverlapError> {
        let orchestrator = BatchOrchestrator::new(self.crawler()?, self.chunker(req.bound_size)?);
        Ok(orchestrator.run(&req.tasks, cancel_token).await)
    }
}

fn cells_to_chunks(cells: Vec<String>) -> Vec<Chunk> {
    cells
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            ordinal,
            text,
            forced_cut: false,
        })
        .collect()
}

#[cfg(test)]
mod tests;
