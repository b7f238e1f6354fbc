//! Repository references as accepted from callers

use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one remote repository (and optionally a branch, tag or commit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: None,
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// `owner/repo` without the ref
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.git_ref {
            Some(git_ref) => write!(f, "{}/{}@{}", self.owner, self.repo, git_ref),
            None => write!(f, "{}/{}", self.owner, self.repo),
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Parses `owner/repo`, `owner/repo@ref` and `https://github.com/owner/repo[/tree/ref]`
impl FromStr for RepositoryRef {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let invalid = || ValidationError::InvalidRepository(input.to_string());

        let path = ["https://github.com/", "http://github.com/", "github.com/"]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        let mut parts = path.split('/');
        let owner = parts.next().ok_or_else(invalid)?;
        let repo_part = parts.next().ok_or_else(invalid)?;
        let rest: Vec<&str> = parts.collect();

        let (repo, mut git_ref) = match repo_part.split_once('@') {
            Some((repo, git_ref)) if !git_ref.is_empty() => (repo, Some(git_ref.to_string())),
            Some(_) => return Err(invalid()),
            None => (repo_part, None),
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        match rest.as_slice() {
            [] => {}
            ["tree", tail @ ..] if !tail.is_empty() && git_ref.is_none() => {
                git_ref = Some(tail.join("/"));
            }
            _ => return Err(invalid()),
        }

        if !is_valid_segment(owner) || !is_valid_segment(repo) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slug() {
        let r: RepositoryRef = "octo/cat".parse().unwrap();
        assert_eq!(r, RepositoryRef::new("octo", "cat"));
        assert_eq!(r.to_string(), "octo/cat");
    }

    #[test]
    fn test_parse_slug_with_ref() {
        let r: RepositoryRef = "octo/cat@v1.2".parse().unwrap();
        assert_eq!(r.git_ref.as_deref(), Some("v1.2"));
        assert_eq!(r.to_string(), "octo/cat@v1.2");
        assert_eq!(r.slug(), "octo/cat");
    }

    #[test]
    fn test_parse_github_url() {
        let r: RepositoryRef = "https://github.com/octo/cat.git".parse().unwrap();
        assert_eq!(r, RepositoryRef::new("octo", "cat"));

        let r: RepositoryRef = "https://github.com/octo/cat/".parse().unwrap();
        assert_eq!(r.repo, "cat");
    }

    #[test]
    fn test_parse_github_tree_url() {
        let r: RepositoryRef = "https://github.com/octo/cat/tree/feature/x".parse().unwrap();
        assert_eq!(r, RepositoryRef::new("octo", "cat").with_ref("feature/x"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "octo", "octo/", "/cat", "octo/cat/blob/main", "octo/ca t", "octo/cat@", "../cat"] {
            assert!(
                input.parse::<RepositoryRef>().is_err(),
                "expected '{}' to be rejected",
                input
            );
        }
    }
}
