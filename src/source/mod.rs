//! Remote repository capabilities consumed by the crawler
//!
//! A [`RepositorySource`] lists directories and fetches raw file content.
//! Listing entries are converted into the [`TreeNode`] variant at this
//! boundary, so nothing loosely typed travels further into the crate.

mod github;
mod memory;
mod repository;

pub use github::GithubSource;
pub use memory::{MemorySource, MemoryTree};
pub use repository::RepositoryRef;

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque locator used to fetch a file's raw content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentLocator(String);

impl ContentLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub locator: ContentLocator,
    /// Size in bytes, when the listing reports it
    pub size: Option<u64>,
}

/// A directory entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
}

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File(FileNode),
    Directory(DirectoryNode),
}

impl TreeNode {
    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.path,
            TreeNode::Directory(dir) => &dir.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(file) => &file.name,
            TreeNode::Directory(dir) => &dir.name,
        }
    }
}

/// A listing entry as reported on the wire by the contents API
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub name: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Conversion of a wire entry into a typed node
///
/// `Ok(None)` means the entry is well-formed but of a kind the crawler never
/// visits (symlinks, submodules).
impl TryFrom<RawEntry> for Option<TreeNode> {
    type Error = SourceError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SourceError::Malformed("listing entry without a name".to_string()))?;
        let path = raw
            .path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SourceError::Malformed(format!("entry '{}' has no path", name)))?;
        let kind = raw
            .kind
            .ok_or_else(|| SourceError::Malformed(format!("entry '{}' has no type", path)))?;

        match kind.as_str() {
            "file" => {
                let locator = raw
                    .download_url
                    .or(raw.url)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| {
                        SourceError::Malformed(format!("file '{}' has no content locator", path))
                    })?;
                Ok(Some(TreeNode::File(FileNode {
                    name,
                    path,
                    locator: ContentLocator::new(locator),
                    size: raw.size,
                })))
            }
            "dir" => Ok(Some(TreeNode::Directory(DirectoryNode { name, path }))),
            "symlink" | "submodule" => Ok(None),
            other => Err(SourceError::Malformed(format!(
                "entry '{}' has unknown type '{}'",
                path, other
            ))),
        }
    }
}

/// Convert a full wire listing, dropping entries that cannot be typed
///
/// Malformed entries are rejected individually; the rest of the listing is kept.
pub fn parse_listing(entries: Vec<RawEntry>) -> Vec<TreeNode> {
    entries
        .into_iter()
        .filter_map(|raw| match Option::<TreeNode>::try_from(raw) {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!("Rejecting listing entry: {}", e);
                None
            }
        })
        .collect()
}

/// Read-only access to a remote repository tree
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// List the entries of one directory, in the order the remote reports them
    ///
    /// `path` is relative to the repository root; the root itself is `""`.
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<TreeNode>, SourceError>;

    /// Fetch the raw text content behind a locator
    async fn fetch_raw_content(&self, locator: &ContentLocator) -> Result<String, SourceError>;
}
