//! In-memory repository trees for offline use and tests

use super::{ContentLocator, DirectoryNode, FileNode, RepositoryRef, RepositorySource, TreeNode};
use crate::error::SourceError;
use std::collections::HashMap;

const SCHEME: &str = "mem://";

#[derive(Debug, Clone)]
enum Entry {
    File { name: String, path: String },
    Dir { name: String, path: String },
}

/// A fixed directory tree of one repository
///
/// Entries are listed in insertion order, so tests can describe exactly the
/// order a remote listing would report. Listing and fetch failures can be
/// injected per path.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    /// directory path ("" for root) -> child entries in listing order
    listings: HashMap<String, Vec<Entry>>,
    contents: HashMap<String, String>,
    failing_listings: HashMap<String, SourceError>,
    failing_fetches: HashMap<String, SourceError>,
}

fn parent_and_name(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self {
            listings: HashMap::from([(String::new(), Vec::new())]),
            contents: HashMap::new(),
            failing_listings: HashMap::new(),
            failing_fetches: HashMap::new(),
        }
    }

    /// Add a file at `path`, creating parent directories as needed
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let (parent, name) = parent_and_name(path);
        self.ensure_dir(parent);
        self.contents.insert(path.to_string(), content.to_string());
        self.listings
            .entry(parent.to_string())
            .or_default()
            .push(Entry::File {
                name: name.to_string(),
                path: path.to_string(),
            });
        self
    }

    /// Add an (empty) directory at `path`
    pub fn with_dir(mut self, path: &str) -> Self {
        self.ensure_dir(path);
        self
    }

    /// Make listing `path` fail with `error`
    pub fn with_failing_listing(mut self, path: &str, error: SourceError) -> Self {
        self.failing_listings.insert(path.to_string(), error);
        self
    }

    /// Make fetching the file at `path` fail with `error`
    pub fn with_failing_fetch(mut self, path: &str, error: SourceError) -> Self {
        self.failing_fetches.insert(path.to_string(), error);
        self
    }

    fn ensure_dir(&mut self, path: &str) {
        if path.is_empty() || self.listings.contains_key(path) {
            return;
        }
        let (parent, name) = parent_and_name(path);
        self.ensure_dir(parent);
        self.listings
            .entry(parent.to_string())
            .or_default()
            .push(Entry::Dir {
                name: name.to_string(),
                path: path.to_string(),
            });
        self.listings.insert(path.to_string(), Vec::new());
    }

    fn list(&self, slug: &str, path: &str) -> Result<Vec<TreeNode>, SourceError> {
        if let Some(error) = self.failing_listings.get(path) {
            return Err(error.clone());
        }
        let entries = self
            .listings
            .get(path)
            .ok_or_else(|| SourceError::NotFound(format!("{}:{}", slug, path)))?;

        Ok(entries
            .iter()
            .map(|entry| match entry {
                Entry::File { name, path } => TreeNode::File(FileNode {
                    name: name.clone(),
                    path: path.clone(),
                    locator: ContentLocator::new(format!("{}{}/{}", SCHEME, slug, path)),
                    size: self.contents.get(path).map(|c| c.len() as u64),
                }),
                Entry::Dir { name, path } => TreeNode::Directory(DirectoryNode {
                    name: name.clone(),
                    path: path.clone(),
                }),
            })
            .collect())
    }

    fn fetch(&self, path: &str) -> Result<String, SourceError> {
        if let Some(error) = self.failing_fetches.get(path) {
            return Err(error.clone());
        }
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}

/// Serves [`MemoryTree`]s keyed by repository
///
/// Locators have the form `mem://{owner}/{repo}/{path}`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    trees: HashMap<String, MemoryTree>,
    /// Tree served for repositories without their own entry
    fallback: Option<MemoryTree>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that answers every repository with the same tree
    pub fn with_tree(tree: MemoryTree) -> Self {
        Self {
            trees: HashMap::new(),
            fallback: Some(tree),
        }
    }

    /// Register the tree of one repository
    pub fn with_repository(mut self, repo: &RepositoryRef, tree: MemoryTree) -> Self {
        self.trees.insert(repo.slug(), tree);
        self
    }

    fn tree(&self, slug: &str) -> Option<&MemoryTree> {
        self.trees.get(slug).or(self.fallback.as_ref())
    }
}

#[async_trait::async_trait]
impl RepositorySource for MemorySource {
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<TreeNode>, SourceError> {
        let slug = repo.slug();
        self.tree(&slug)
            .ok_or_else(|| SourceError::NotFound(repo.to_string()))?
            .list(&slug, path)
    }

    async fn fetch_raw_content(&self, locator: &ContentLocator) -> Result<String, SourceError> {
        let rest = locator
            .as_str()
            .strip_prefix(SCHEME)
            .ok_or_else(|| SourceError::Malformed(format!("not a memory locator: {}", locator)))?;

        let mut parts = rest.splitn(3, '/');
        let (Some(owner), Some(repo), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SourceError::Malformed(format!("incomplete locator: {}", locator)));
        };

        self.tree(&format!("{}/{}", owner, repo))
            .ok_or_else(|| SourceError::NotFound(locator.to_string()))?
            .fetch(path)
    }
}
