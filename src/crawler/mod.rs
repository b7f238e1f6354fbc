//! Depth-first crawl of a remote repository tree into a corpus
//!
//! The traversal keeps an explicit stack of pending directory listings rather
//! than recursing, so tree depth never grows the call stack and cancellation
//! can be checked between every step. Sibling files of one directory may be
//! fetched concurrently; their contents are reassembled in listing order, so
//! the corpus only depends on the remote state.

mod filter;

pub use filter::PathFilter;

use crate::config::CrawlConfig;
use crate::corpus::{CodeCorpus, CorpusBuilder};
use crate::error::{ConfigError, CrawlError, FetchError, ListingError};
use crate::source::{FileNode, RepositoryRef, RepositorySource, TreeNode};
use futures::stream::{self, StreamExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Why a node was left out of the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A nested directory could not be listed; its subtree is missing
    ListingFailed,
    /// A selected file could not be fetched
    FetchFailed,
    /// The listing reported a size above the configured maximum
    FileTooLarge,
    /// The path matched an exclude pattern
    Excluded,
}

/// A non-fatal event recorded while crawling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CrawlDiagnostic {
    pub path: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Result of crawling one repository
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub corpus: CodeCorpus,
    /// Files whose content is part of the corpus
    pub files_included: usize,
    /// Files left out by the extension filter
    pub files_skipped: usize,
    pub directories_visited: usize,
    pub diagnostics: Vec<CrawlDiagnostic>,
}

/// Mutable state of one crawl
struct CrawlState {
    corpus: CorpusBuilder,
    files_skipped: usize,
    directories_visited: usize,
    diagnostics: Vec<CrawlDiagnostic>,
}

impl CrawlState {
    fn diagnose(&mut self, path: &str, kind: DiagnosticKind, message: String) {
        self.diagnostics.push(CrawlDiagnostic {
            path: path.to_string(),
            kind,
            message,
        });
    }
}

/// Walks a remote repository and builds its corpus
#[derive(Clone)]
pub struct TreeCrawler {
    source: Arc<dyn RepositorySource>,
    filter: PathFilter,
    max_file_size: u64,
    max_concurrent_fetches: usize,
}

impl TreeCrawler {
    pub fn new(source: Arc<dyn RepositorySource>, config: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            filter: PathFilter::from_config(config)?,
            max_file_size: config.max_file_size,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        })
    }

    /// Crawl `repo` from its root
    ///
    /// Only a failure to list the root aborts the crawl. Failures listing a
    /// nested directory or fetching a file are recorded as diagnostics and the
    /// traversal continues with the remaining tree. A cancelled crawl returns
    /// [`CrawlError::Cancelled`] and its partial corpus is dropped.
    pub async fn crawl(
        &self,
        repo: &RepositoryRef,
        cancel_token: &CancellationToken,
    ) -> Result<CrawlOutcome, CrawlError> {
        tracing::info!("Crawling repository {}", repo);

        let root = cancellable(cancel_token, self.source.list_directory(repo, ""))
            .await?
            .map_err(|source| ListingError::Root {
                repository: repo.to_string(),
                source,
            })?;

        let mut state = CrawlState {
            corpus: CorpusBuilder::new(),
            files_skipped: 0,
            directories_visited: 1,
            diagnostics: Vec::new(),
        };

        // Each frame holds the not-yet-visited entries of one directory
        let mut stack = vec![root.into_iter()];
        // Selected files of the top frame waiting to be fetched, in listing order
        let mut pending: Vec<FileNode> = Vec::new();

        while let Some(frame) = stack.last_mut() {
            if cancel_token.is_cancelled() {
                tracing::info!(
                    "Crawl of {} cancelled after {} files",
                    repo,
                    state.corpus.file_count()
                );
                return Err(CrawlError::Cancelled);
            }

            match frame.next() {
                Some(TreeNode::File(file)) => self.select_file(file, &mut pending, &mut state),
                Some(TreeNode::Directory(dir)) => {
                    // Files listed before this directory come first in the corpus
                    self.fetch_pending(&mut pending, &mut state, cancel_token)
                        .await?;

                    if self.filter.is_excluded(&dir.path) {
                        tracing::debug!("Skipping excluded directory {}", dir.path);
                        state.diagnose(
                            &dir.path,
                            DiagnosticKind::Excluded,
                            "directory matches an exclude pattern".to_string(),
                        );
                        continue;
                    }

                    match cancellable(cancel_token, self.source.list_directory(repo, &dir.path))
                        .await?
                    {
                        Ok(entries) => {
                            state.directories_visited += 1;
                            stack.push(entries.into_iter());
                        }
                        Err(source) => {
                            let err = ListingError::Directory {
                                path: dir.path.clone(),
                                source,
                            };
                            tracing::warn!("{}", err);
                            state.diagnose(&dir.path, DiagnosticKind::ListingFailed, err.to_string());
                        }
                    }
                }
                None => {
                    self.fetch_pending(&mut pending, &mut state, cancel_token)
                        .await?;
                    stack.pop();
                }
            }
        }

        let corpus = state.corpus.finish();
        tracing::info!(
            "Crawled {}: {} files, {} characters, {} diagnostics",
            repo,
            corpus.file_count(),
            corpus.len(),
            state.diagnostics.len()
        );

        Ok(CrawlOutcome {
            files_included: corpus.file_count(),
            corpus,
            files_skipped: state.files_skipped,
            directories_visited: state.directories_visited,
            diagnostics: state.diagnostics,
        })
    }

    fn select_file(&self, file: FileNode, pending: &mut Vec<FileNode>, state: &mut CrawlState) {
        if !self.filter.accepts_file_name(&file.name) {
            tracing::debug!("Skipping non-source file {}", file.path);
            state.files_skipped += 1;
            return;
        }
        if self.filter.is_excluded(&file.path) {
            state.diagnose(
                &file.path,
                DiagnosticKind::Excluded,
                "file matches an exclude pattern".to_string(),
            );
            return;
        }
        if let Some(size) = file.size
            && size > self.max_file_size
        {
            tracing::debug!("Skipping large file {} ({} bytes)", file.path, size);
            state.diagnose(
                &file.path,
                DiagnosticKind::FileTooLarge,
                format!("{} bytes exceeds limit of {}", size, self.max_file_size),
            );
            return;
        }
        pending.push(file);
    }

    /// Fetch queued files concurrently and append them in queue order
    async fn fetch_pending(
        &self,
        pending: &mut Vec<FileNode>,
        state: &mut CrawlState,
        cancel_token: &CancellationToken,
    ) -> Result<(), CrawlError> {
        if pending.is_empty() {
            return Ok(());
        }

        let fetches = stream::iter(pending.drain(..))
            .map(|file| async move {
                let content = self.source.fetch_raw_content(&file.locator).await;
                (file, content)
            })
            .buffered(self.max_concurrent_fetches)
            .collect::<Vec<_>>();

        for (file, content) in cancellable(cancel_token, fetches).await? {
            match content {
                Ok(content) => state.corpus.push_file(&content),
                Err(source) => {
                    let err = FetchError {
                        path: file.path.clone(),
                        source,
                    };
                    tracing::warn!("{}", err);
                    state.diagnose(&file.path, DiagnosticKind::FetchFailed, err.to_string());
                }
            }
        }
        Ok(())
    }
}

/// Await `fut` unless the token is cancelled first
async fn cancellable<F: Future>(
    cancel_token: &CancellationToken,
    fut: F,
) -> Result<F::Output, CrawlError> {
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => Err(CrawlError::Cancelled),
        output = fut => Ok(output),
    }
}
