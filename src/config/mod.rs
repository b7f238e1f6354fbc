/// Configuration system for repo-overlap
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, OverlapError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote repository API configuration
    #[serde(default)]
    pub github: GithubConfig,

    /// Tree crawl configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

/// GitHub contents API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the API (override for GitHub Enterprise or tests)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Personal access token sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User-Agent header value (the API rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout in seconds for a single listing or fetch request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Tree crawl configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// File name suffixes selected for the corpus, including the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns for paths that are never visited (empty: visit everything)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum file size (in bytes) when the listing reports one
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Upper bound on concurrent file fetches within one directory
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_bound_size")]
    pub bound_size: usize,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("repo-overlap/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_extensions() -> Vec<String> {
    [".js", ".ts", ".py", ".java", ".cpp", ".html", ".css"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_max_file_size() -> u64 {
    1_048_576 // 1 MB
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_bound_size() -> usize {
    30_000
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_patterns: Vec::new(),
            max_file_size: default_max_file_size(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            bound_size: default_bound_size(),
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> OverlapError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, OverlapError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, OverlapError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), OverlapError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), OverlapError> {
        let api_url = self.github.api_url.as_str();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(invalid(
                "github.api_url",
                format!("must be an http(s) URL, got '{}'", api_url),
            ));
        }

        if self.github.timeout_secs == 0 {
            return Err(invalid("github.timeout_secs", "must be greater than 0"));
        }

        if self.crawl.extensions.is_empty() {
            return Err(invalid("crawl.extensions", "must list at least one extension"));
        }

        if let Some(ext) = self
            .crawl
            .extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(invalid(
                "crawl.extensions",
                format!("'{}' must start with '.' followed by a suffix", ext),
            ));
        }

        for pattern in &self.crawl.exclude_patterns {
            if let Err(e) = globset::Glob::new(pattern) {
                return Err(invalid(
                    "crawl.exclude_patterns",
                    format!("invalid glob '{}': {}", pattern, e),
                ));
            }
        }

        if self.crawl.max_file_size == 0 {
            return Err(invalid("crawl.max_file_size", "must be greater than 0"));
        }

        if self.crawl.max_concurrent_fetches == 0 {
            return Err(invalid("crawl.max_concurrent_fetches", "must be greater than 0"));
        }

        if self.chunking.bound_size == 0 {
            return Err(invalid("chunking.bound_size", "must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REPO_OVERLAP_API_URL") {
            self.github.api_url = url;
        }

        // Explicit token wins over the conventional GITHUB_TOKEN
        if let Ok(token) = std::env::var("REPO_OVERLAP_TOKEN") {
            self.github.token = Some(token);
        } else if self.github.token.is_none()
            && let Ok(token) = std::env::var("GITHUB_TOKEN")
        {
            self.github.token = Some(token);
        }

        if let Ok(timeout) = std::env::var("REPO_OVERLAP_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse()
        {
            self.github.timeout_secs = secs;
        }

        if let Ok(extensions) = std::env::var("REPO_OVERLAP_EXTENSIONS") {
            self.crawl.extensions = extensions
                .split(',')
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(limit) = std::env::var("REPO_OVERLAP_MAX_CONCURRENT_FETCHES")
            && let Ok(limit) = limit.parse()
        {
            self.crawl.max_concurrent_fetches = limit;
        }

        if let Ok(bound) = std::env::var("REPO_OVERLAP_BOUND_SIZE")
            && let Ok(bound) = bound.parse()
        {
            self.chunking.bound_size = bound;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, OverlapError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
