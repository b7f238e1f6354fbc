use super::*;
use crate::batch::ReviewTask;
use crate::error::{ChunkingError, CrawlError, SourceError};
use crate::source::{ContentLocator, MemorySource, MemoryTree, TreeNode};
use std::sync::atomic::{AtomicUsize, Ordering};

// Helper to create a client over an in-memory repository
fn create_test_client(tree: MemoryTree) -> OverlapClient {
    OverlapClient::with_source(Config::default(), Arc::new(MemorySource::with_tree(tree)))
}

fn repo() -> RepositoryRef {
    RepositoryRef::new("octo", "cat")
}

/// Counts every remote call
struct CountingSource {
    inner: MemorySource,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl RepositorySource for CountingSource {
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<TreeNode>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_directory(repo, path).await
    }

    async fn fetch_raw_content(&self, locator: &ContentLocator) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_raw_content(locator).await
    }
}

// ===== Client Initialization Tests =====

#[test]
fn test_with_config_builds_github_source() {
    let client = OverlapClient::with_config(Config::default());
    assert!(client.is_ok());
}

#[test]
fn test_with_config_rejects_invalid_config() {
    let mut config = Config::default();
    config.chunking.bound_size = 0;
    assert!(OverlapClient::with_config(config).is_err());
}

#[test]
fn test_client_clone_and_config_accessor() {
    let client = create_test_client(MemoryTree::new());
    let cloned = client.clone();
    assert_eq!(cloned.config().chunking.bound_size, 30_000);
}

// ===== crawl_and_chunk Tests =====

#[tokio::test]
async fn test_crawl_and_chunk() {
    let tree = MemoryTree::new()
        .with_file("a.py", "a1\na2")
        .with_file("b.py", "b1");
    let client = create_test_client(tree);

    let response = client
        .crawl_and_chunk(&repo(), Some(6), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.repository, "octo/cat");
    assert_eq!(response.corpus_length, 9);
    assert_eq!(response.files_included, 2);
    let texts: Vec<&str> = response.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a1\na2\n", "b1\n"]);
}

#[tokio::test]
async fn test_crawl_and_chunk_uses_configured_bound() {
    let mut config = Config::default();
    config.chunking.bound_size = 3;
    let tree = MemoryTree::new().with_file("a.js", "ab\ncd\nef");
    let client = OverlapClient::with_source(config, Arc::new(MemorySource::with_tree(tree)));

    let response = client
        .crawl_and_chunk(&repo(), None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.chunks.len(), 3);
}

#[tokio::test]
async fn test_invalid_bound_rejected_before_network() {
    let source = Arc::new(CountingSource {
        inner: MemorySource::with_tree(MemoryTree::new().with_file("a.js", "a")),
        calls: AtomicUsize::new(0),
    });
    let client = OverlapClient::with_source(Config::default(), source.clone());

    let err = client
        .crawl_and_chunk(&repo(), Some(0), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OverlapError::Chunking(ChunkingError::InvalidBoundSize(0))
    ));

    let err = client
        .run_batch(
            BatchRequest {
                tasks: vec![ReviewTask::new("ana", "octo/cat")],
                bound_size: Some(0),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OverlapError::Chunking(_)));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_crawl_and_chunk_root_failure() {
    let tree = MemoryTree::new().with_failing_listing("", SourceError::NotFound("octo/cat".into()));
    let client = create_test_client(tree);

    let err = client
        .crawl_and_chunk(&repo(), None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OverlapError::Crawl(CrawlError::Listing(_))));
    assert!(!err.is_retryable());
}

// ===== diff Tests =====

#[test]
fn test_diff_cells() {
    let client = create_test_client(MemoryTree::new());
    let response = client.diff_cells(DiffRequest {
        chunks_a: vec!["x\ny\n".to_string(), "z\n".to_string()],
        chunks_b: vec!["z\nq\n".to_string(), "y\n".to_string()],
    });
    assert_eq!(response.common_lines, vec!["z", "y"]);
    assert_eq!(response.count, 2);
}

// ===== run_batch Tests =====

#[tokio::test]
async fn test_run_batch() {
    let source = MemorySource::new()
        .with_repository(
            &RepositoryRef::new("team", "one"),
            MemoryTree::new().with_file("x.ts", "shared();\nonly_one();"),
        )
        .with_repository(
            &RepositoryRef::new("team", "two"),
            MemoryTree::new().with_file("y.ts", "only_two();\nshared();"),
        );
    let client = OverlapClient::with_source(Config::default(), Arc::new(source));

    let report = client
        .run_batch(
            BatchRequest {
                tasks: vec![
                    ReviewTask::new("first", "team/one"),
                    ReviewTask::new("second", "team/two"),
                ],
                bound_size: None,
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.tasks.len(), 2);
    assert!(!report.cancelled);
    assert!(report.finished_at >= report.started_at);
    assert_eq!(report.tasks[1].common_lines_text().as_deref(), Some("shared();"));
}
