//! File selection and path exclusion for the crawler

use crate::config::CrawlConfig;
use crate::error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Decides which listing entries the crawler visits
#[derive(Debug, Clone)]
pub struct PathFilter {
    extensions: Vec<String>,
    exclude: GlobSet,
}

impl PathFilter {
    /// Build a filter from an extension allow-list and exclude globs
    pub fn new(extensions: Vec<String>, exclude_patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
                key: "crawl.exclude_patterns".to_string(),
                reason: format!("invalid glob '{}': {}", pattern, e),
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|e| ConfigError::InvalidValue {
            key: "crawl.exclude_patterns".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            extensions,
            exclude,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(config.extensions.clone(), &config.exclude_patterns)
    }

    /// True when the file name ends with an allowed extension (case-sensitive)
    pub fn accepts_file_name(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// True when `path` or any trailing part of it matches an exclude glob
    ///
    /// Matching suffixes lets `node_modules/**` exclude `web/node_modules/x`.
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let path = path.trim_start_matches('/');
        if self.exclude.is_match(path) {
            return true;
        }
        path.match_indices('/')
            .any(|(i, _)| self.exclude.is_match(&path[i + 1..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(excludes: &[&str]) -> PathFilter {
        let config = CrawlConfig::default();
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        PathFilter::new(config.extensions, &excludes).unwrap()
    }

    #[test]
    fn test_default_extensions() {
        let f = filter(&[]);
        assert!(f.accepts_file_name("index.ts"));
        assert!(f.accepts_file_name("main.py"));
        assert!(f.accepts_file_name("styles.css"));
        assert!(!f.accepts_file_name("readme.md"));
        assert!(!f.accepts_file_name("Cargo.toml"));
    }

    #[test]
    fn test_suffix_semantics() {
        let f = filter(&[]);
        // Suffix match, as with a plain "ends with" check
        assert!(f.accepts_file_name("bundle.min.js"));
        assert!(f.accepts_file_name("types.d.ts"));
        assert!(!f.accepts_file_name("INDEX.TS"));
        assert!(!f.accepts_file_name("js"));
    }

    #[test]
    fn test_custom_extensions() {
        let f = PathFilter::new(vec![".rs".to_string(), ".go".to_string()], &[]).unwrap();
        assert!(f.accepts_file_name("lib.rs"));
        assert!(f.accepts_file_name("main.go"));
        assert!(!f.accepts_file_name("index.js"));
    }

    #[test]
    fn test_no_excludes_matches_nothing() {
        let f = filter(&[]);
        assert!(!f.is_excluded("node_modules"));
        assert!(!f.is_excluded("src/index.ts"));
    }

    #[test]
    fn test_exclude_patterns() {
        let f = filter(&["node_modules", "**/*.min.js", "dist/**"]);
        assert!(f.is_excluded("node_modules"));
        assert!(f.is_excluded("web/node_modules"));
        assert!(f.is_excluded("static/vendor/jquery.min.js"));
        assert!(f.is_excluded("dist/app.js"));
        assert!(f.is_excluded("packages/ui/dist/app.js"));
        assert!(!f.is_excluded("src/app.js"));
        assert!(!f.is_excluded("distribution/app.js"));
    }

    #[test]
    fn test_invalid_glob() {
        let result = PathFilter::new(vec![".js".to_string()], &["src/[".to_string()]);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
