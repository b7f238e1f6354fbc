//! GitHub contents API adapter

use super::{ContentLocator, RawEntry, RepositoryRef, RepositorySource, TreeNode, parse_listing};
use crate::config::GithubConfig;
use crate::error::{OverlapError, SourceError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Lists and fetches repository content through `GET /repos/{owner}/{repo}/contents/{path}`
///
/// ## Example
///
/// ```rust,no_run
/// use repo_overlap::config::GithubConfig;
/// use repo_overlap::source::{GithubSource, RepositoryRef, RepositorySource};
///
/// # async fn example() -> anyhow::Result<()> {
/// let source = GithubSource::new(&GithubConfig::default())?;
/// let repo: RepositoryRef = "rust-lang/mdBook".parse()?;
/// let root = source.list_directory(&repo, "").await?;
/// println!("{} entries at the root", root.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GithubSource {
    api_url: Url,
    http_client: Client,
}

impl GithubSource {
    /// Build a source with its own HTTP client configured from `config`
    pub fn new(config: &GithubConfig) -> Result<Self, OverlapError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| OverlapError::other(format!("Invalid GitHub token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| OverlapError::other(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(&config.api_url, http_client)
    }

    /// Build a source around an existing HTTP client
    pub fn with_client(api_url: &str, http_client: Client) -> Result<Self, OverlapError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| OverlapError::other(format!("Invalid API URL '{}': {}", api_url, e)))?;
        Ok(Self {
            api_url,
            http_client,
        })
    }

    fn contents_url(&self, repo: &RepositoryRef, path: &str) -> Result<Url, SourceError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Malformed(format!("API URL '{}' cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        if let Some(git_ref) = &repo.git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        Ok(url)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Transient(format!("Request to {} timed out", url))
                } else {
                    SourceError::Transient(format!("HTTP request to {} failed: {}", url, e))
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
            status => Err(SourceError::Transient(format!("HTTP {} from {}", status, url))),
        }
    }
}

/// Decode a contents-API file object (`{"content": "<base64>", "encoding": "base64"}`)
fn decode_file_object(value: &serde_json::Value) -> Result<String, SourceError> {
    let content = value
        .get("content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| SourceError::Malformed("response has no 'content' field".to_string()))?;

    if let Some(encoding) = value.get("encoding").and_then(|e| e.as_str())
        && encoding != "base64"
    {
        return Err(SourceError::Malformed(format!(
            "unsupported content encoding '{}'",
            encoding
        )));
    }

    // The API wraps base64 payloads at 60 columns
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SourceError::Malformed(format!("invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait::async_trait]
impl RepositorySource for GithubSource {
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<TreeNode>, SourceError> {
        let url = self.contents_url(repo, path)?;
        tracing::debug!("Listing {} at '{}'", repo, path);

        let body: serde_json::Value = self
            .get(url.as_str())
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Malformed(format!("invalid listing body: {}", e)))?;

        if !body.is_array() {
            return Err(SourceError::Malformed(format!(
                "expected a directory listing at '{}'",
                path
            )));
        }

        let entries: Vec<RawEntry> = serde_json::from_value(body)
            .map_err(|e| SourceError::Malformed(format!("invalid listing entries: {}", e)))?;
        Ok(parse_listing(entries))
    }

    async fn fetch_raw_content(&self, locator: &ContentLocator) -> Result<String, SourceError> {
        let response = self.get(locator.as_str()).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Transient(format!("failed to read body: {}", e)))?;

        if !is_json {
            return Ok(text);
        }

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::String(s)) => Ok(s),
            Ok(value @ serde_json::Value::Object(_)) => decode_file_object(&value),
            Ok(_) => Err(SourceError::Malformed(format!(
                "unexpected JSON body from {}",
                locator
            ))),
            // Raw endpoints may mislabel source files as JSON
            Err(_) => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> GithubSource {
        GithubSource::with_client("https://api.github.com", Client::new()).unwrap()
    }

    #[test]
    fn test_contents_url_root() {
        let url = source()
            .contents_url(&RepositoryRef::new("octo", "cat"), "")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/octo/cat/contents");
    }

    #[test]
    fn test_contents_url_nested_with_ref() {
        let repo = RepositoryRef::new("octo", "cat").with_ref("dev");
        let url = source().contents_url(&repo, "src/my dir").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/cat/contents/src/my%20dir?ref=dev"
        );
    }

    #[test]
    fn test_contents_url_with_base_path() {
        let source = GithubSource::with_client("https://ghe.example.com/api/v3/", Client::new())
            .unwrap();
        let url = source
            .contents_url(&RepositoryRef::new("o", "r"), "lib")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/o/r/contents/lib"
        );
    }

    #[test]
    fn test_decode_file_object() {
        let value = serde_json::json!({
            "content": "Y29uc3QgeCA9\nIDE7Cg==\n",
            "encoding": "base64"
        });
        assert_eq!(decode_file_object(&value).unwrap(), "const x = 1;\n");
    }

    #[test]
    fn test_decode_file_object_rejects_missing_content() {
        let value = serde_json::json!({ "message": "Not Found" });
        assert!(matches!(
            decode_file_object(&value),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_file_object_rejects_other_encoding() {
        let value = serde_json::json!({ "content": "", "encoding": "none" });
        assert!(decode_file_object(&value).is_err());
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(GithubSource::with_client("not a url", Client::new()).is_err());
    }
}
