use crate::batch::{BatchReport, ReviewTask};
use crate::chunker::Chunk;
use crate::crawler::CrawlDiagnostic;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for a chunk bound size in requests
pub const MAX_BOUND_SIZE: usize = 10_000_000;

/// Upper bound on the number of tasks in one batch request
pub const MAX_BATCH_TASKS: usize = 1_000;

fn validate_bound_size(bound_size: Option<usize>) -> Result<(), String> {
    match bound_size {
        Some(0) => Err("bound_size must be greater than 0".to_string()),
        Some(size) if size > MAX_BOUND_SIZE => Err(format!(
            "bound_size must be at most {} (got {})",
            MAX_BOUND_SIZE, size
        )),
        _ => Ok(()),
    }
}

/// Request to crawl one repository and chunk its corpus
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrawlRequest {
    /// Repository as `owner/repo`, `owner/repo@ref` or a GitHub URL
    pub repository: String,
    /// Maximum chunk length in characters (default from configuration)
    #[serde(default)]
    pub bound_size: Option<usize>,
}

impl CrawlRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.repository.trim().is_empty() {
            return Err("repository cannot be empty".to_string());
        }
        validate_bound_size(self.bound_size)
    }
}

/// Corpus summary and chunks of one repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrawlResponse {
    /// Canonical repository reference that was crawled
    pub repository: String,
    /// Corpus length in characters
    pub corpus_length: usize,
    /// SHA-256 of the corpus text
    pub corpus_fingerprint: String,
    pub files_included: usize,
    pub files_skipped: usize,
    pub directories_visited: usize,
    /// Chunks in corpus order
    pub chunks: Vec<Chunk>,
    /// Non-fatal problems met during the crawl
    #[serde(default)]
    pub diagnostics: Vec<CrawlDiagnostic>,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

/// Request to find lines shared by two chunk sequences
///
/// Either side may be empty: an empty corpus chunks to no cells.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiffRequest {
    /// Chunk texts of the first corpus, in order
    #[serde(default)]
    pub chunks_a: Vec<String>,
    /// Chunk texts of the second corpus, in order; result order follows these
    #[serde(default)]
    pub chunks_b: Vec<String>,
}

/// Lines present in both chunk sequences
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiffResponse {
    /// Distinct common lines, in first-seen order within `chunks_b`
    pub common_lines: Vec<String>,
    pub count: usize,
}

/// Request to review an ordered list of repositories
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchRequest {
    /// Tasks in processing order
    pub tasks: Vec<ReviewTask>,
    /// Maximum chunk length in characters (default from configuration)
    #[serde(default)]
    pub bound_size: Option<usize>,
}

impl BatchRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.tasks.is_empty() {
            return Err("tasks cannot be empty".to_string());
        }
        if self.tasks.len() > MAX_BATCH_TASKS {
            return Err(format!(
                "at most {} tasks per batch (got {})",
                MAX_BATCH_TASKS,
                self.tasks.len()
            ));
        }
        if let Some(task) = self.tasks.iter().find(|t| t.identity.trim().is_empty()) {
            return Err(format!(
                "task for repository '{}' has an empty identity",
                task.repository
            ));
        }
        validate_bound_size(self.bound_size)
    }
}

/// Per-task reports of a batch
pub type BatchResponse = BatchReport;
