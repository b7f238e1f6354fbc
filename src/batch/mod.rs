//! Sequential batch review: crawl, chunk and compare each task with its predecessor
//!
//! Tasks run strictly in list order. Only the chunks of the last successful
//! task are carried forward in [`BatchState`], so a batch holds at most two
//! corpora at once no matter how long the task list is.

use crate::chunker::{Chunk, CorpusChunker};
use crate::crawler::{CrawlDiagnostic, TreeCrawler};
use crate::error::{CrawlError, ValidationError};
use crate::similarity::common_lines;
use crate::source::RepositoryRef;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// One repository-review unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewTask {
    /// Caller-chosen identity (candidate name, team, row id)
    pub identity: String,
    /// Repository as `owner/repo`, `owner/repo@ref` or a GitHub URL
    pub repository: String,
}

impl ReviewTask {
    pub fn new(identity: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            repository: repository.into(),
        }
    }
}

/// Parse a task list
///
/// Accepts a JSON array of `{identity, repository}` objects, or plain text
/// with one task per line: `identity repository`, or a bare repository that
/// doubles as its own identity. Blank lines and `#` comments are ignored.
pub fn parse_task_list(input: &str) -> Result<Vec<ReviewTask>, ValidationError> {
    let trimmed = input.trim_start();
    let tasks: Vec<ReviewTask> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| ValidationError::ConstraintViolation {
            field: "tasks".to_string(),
            constraint: "JSON array of {identity, repository}".to_string(),
            actual: e.to_string(),
        })?
    } else {
        input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| match line.rsplit_once(char::is_whitespace) {
                Some((identity, repository)) => ReviewTask::new(identity.trim(), repository),
                None => ReviewTask::new(line, line),
            })
            .collect()
    };

    if tasks.is_empty() {
        return Err(ValidationError::Empty("tasks".to_string()));
    }
    Ok(tasks)
}

/// Lines shared with the previous successful task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Comparison {
    /// Identity of the task compared against
    pub against: String,
    /// Shared lines, in first-seen order within this task's corpus
    pub common_lines: Vec<String>,
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded {
        corpus_length: usize,
        corpus_fingerprint: String,
        files_included: usize,
        chunks: Vec<Chunk>,
        diagnostics: Vec<CrawlDiagnostic>,
        /// Absent for the first successful task of a batch
        comparison: Option<Comparison>,
    },
    Failed {
        error: String,
    },
}

/// Report for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskReport {
    pub identity: String,
    pub repository: String,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Succeeded { .. })
    }

    pub fn chunks(&self) -> &[Chunk] {
        match &self.outcome {
            TaskOutcome::Succeeded { chunks, .. } => chunks,
            TaskOutcome::Failed { .. } => &[],
        }
    }

    /// One storage cell per chunk
    pub fn chunk_cells(&self) -> Vec<String> {
        self.chunks().iter().map(|c| c.text.clone()).collect()
    }

    /// Newline-joined common lines, when a comparison was made
    pub fn common_lines_text(&self) -> Option<String> {
        match &self.outcome {
            TaskOutcome::Succeeded {
                comparison: Some(comparison),
                ..
            } => Some(comparison.common_lines.join("\n")),
            _ => None,
        }
    }
}

/// Reports of a whole batch
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchReport {
    /// Completed tasks in list order
    pub tasks: Vec<TaskReport>,
    /// True when the batch stopped early; the interrupted task is not reported
    pub cancelled: bool,
    /// Unix timestamps (seconds)
    pub started_at: i64,
    pub finished_at: i64,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.tasks.len() - self.succeeded()
    }
}

/// Chunks of the last successful task
#[derive(Debug, Clone)]
struct PreviousCorpus {
    identity: String,
    chunks: Vec<Chunk>,
}

/// State threaded through a batch run
///
/// Owned by the caller of [`BatchOrchestrator::process_task`], so independent
/// batches never share anything.
#[derive(Debug, Default)]
pub struct BatchState {
    previous: Option<PreviousCorpus>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the task the next one will be compared against
    pub fn previous_identity(&self) -> Option<&str> {
        self.previous.as_ref().map(|p| p.identity.as_str())
    }
}

/// Drives crawl, chunking and comparison over an ordered task list
#[derive(Clone)]
pub struct BatchOrchestrator {
    crawler: TreeCrawler,
    chunker: CorpusChunker,
}

impl BatchOrchestrator {
    pub fn new(crawler: TreeCrawler, chunker: CorpusChunker) -> Self {
        Self { crawler, chunker }
    }

    /// Run every task in order
    ///
    /// Task failures are reported and the batch moves on. Cancellation stops
    /// the batch; tasks completed before it stay in the report.
    pub async fn run(&self, tasks: &[ReviewTask], cancel_token: &CancellationToken) -> BatchReport {
        let started_at = Utc::now().timestamp();
        let mut state = BatchState::new();
        let mut reports = Vec::with_capacity(tasks.len());
        let mut cancelled = false;

        tracing::info!("Starting batch of {} tasks", tasks.len());

        for task in tasks {
            if cancel_token.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.process_task(task, &mut state, cancel_token).await {
                Ok(report) => reports.push(report),
                Err(CrawlError::Cancelled) => {
                    tracing::info!("Batch cancelled during task '{}'", task.identity);
                    cancelled = true;
                    break;
                }
                Err(e) => reports.push(failed(task, e.to_string())),
            }
        }

        let report = BatchReport {
            tasks: reports,
            cancelled,
            started_at,
            finished_at: Utc::now().timestamp(),
        };
        tracing::info!(
            "Batch finished: {} succeeded, {} failed{}",
            report.succeeded(),
            report.failed(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        report
    }

    /// Process one task against `state`
    ///
    /// Returns `Err` only when the task's crawl could not produce a result at
    /// all (cancellation, root listing failure); `run` turns the latter into a
    /// failed report. `state` is only advanced by a successful task.
    pub async fn process_task(
        &self,
        task: &ReviewTask,
        state: &mut BatchState,
        cancel_token: &CancellationToken,
    ) -> Result<TaskReport, CrawlError> {
        let repository: RepositoryRef = match task.repository.parse() {
            Ok(repository) => repository,
            Err(e) => {
                tracing::warn!("Task '{}' has an invalid repository: {}", task.identity, e);
                return Ok(failed(task, format!("{}", e)));
            }
        };

        let outcome = self.crawler.crawl(&repository, cancel_token).await?;
        let chunks = self.chunker.chunk(outcome.corpus.as_str());

        let comparison = state.previous.as_ref().map(|previous| Comparison {
            against: previous.identity.clone(),
            common_lines: common_lines(&previous.chunks, &chunks),
        });

        if let Some(comparison) = &comparison {
            tracing::info!(
                "Task '{}' shares {} lines with '{}'",
                task.identity,
                comparison.common_lines.len(),
                comparison.against
            );
        }

        state.previous = Some(PreviousCorpus {
            identity: task.identity.clone(),
            chunks: chunks.clone(),
        });

        Ok(TaskReport {
            identity: task.identity.clone(),
            repository: repository.to_string(),
            outcome: TaskOutcome::Succeeded {
                corpus_length: outcome.corpus.len(),
                corpus_fingerprint: outcome.corpus.fingerprint(),
                files_included: outcome.files_included,
                chunks,
                diagnostics: outcome.diagnostics,
                comparison,
            },
        })
    }
}

fn failed(task: &ReviewTask, error: String) -> TaskReport {
    TaskReport {
        identity: task.identity.clone(),
        repository: task.repository.clone(),
        outcome: TaskOutcome::Failed { error },
    }
}
