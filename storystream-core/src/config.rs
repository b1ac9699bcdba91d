use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Value shipped in fresh configurations; treated the same as no URL.
pub const PLACEHOLDER_DOCUMENT_URL: &str = "YOUR_PUBLISHED_GOOGLE_DOC_URL_HERE";

const DEFAULT_STALENESS_HOURS: u64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlogConfig {
    /// Published document to import posts from.
    pub document_url: Option<String>,
    /// Author written on every imported post.
    pub author_name: String,
    pub storage_key: String,
    pub staleness_hours: u64,
    pub excerpt_length: usize,
    pub request_timeout_seconds: u64,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            document_url: None,
            author_name: "Respeita Nóis".to_owned(),
            storage_key: "respeitaNoisBlogPosts".to_owned(),
            staleness_hours: DEFAULT_STALENESS_HOURS,
            excerpt_length: 150,
            request_timeout_seconds: 10,
        }
    }
}

impl BlogConfig {
    /// Loads the configuration, using defaults when the file is missing or invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to read config, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// URL to import from, or `None` when unset or still the placeholder.
    pub fn import_url(&self) -> Option<&str> {
        self.document_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_DOCUMENT_URL)
    }

    /// Falls back to the default 24 hours when the configured value is out of range.
    pub fn staleness_window(&self) -> chrono::Duration {
        let window = i64::try_from(self.staleness_hours)
            .ok()
            .and_then(chrono::Duration::try_hours);
        match window {
            Some(window) => window,
            None => {
                warn!(
                    staleness_hours = self.staleness_hours,
                    "staleness window out of range, using 24 hours"
                );
                chrono::Duration::hours(DEFAULT_STALENESS_HOURS as i64)
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

// Linux: ~/.config/storystream
pub fn config_dir() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("storystream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_urls_count_as_unset() {
        let mut config = BlogConfig::default();
        assert_eq!(config.import_url(), None);

        config.document_url = Some(PLACEHOLDER_DOCUMENT_URL.to_owned());
        assert_eq!(config.import_url(), None);

        config.document_url = Some("   ".to_owned());
        assert_eq!(config.import_url(), None);

        config.document_url = Some("https://docs.example.com/pub".to_owned());
        assert_eq!(config.import_url(), Some("https://docs.example.com/pub"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: BlogConfig =
            serde_json::from_str(r#"{ "document_url": "https://e/doc", "staleness_hours": 6 }"#)
                .unwrap();
        assert_eq!(config.staleness_hours, 6);
        assert_eq!(config.excerpt_length, 150);
        assert_eq!(config.storage_key, "respeitaNoisBlogPosts");
    }

    #[test]
    fn out_of_range_staleness_uses_default_window() {
        let default_window = chrono::Duration::hours(24);
        for hours in [u64::MAX, 10_000_000_000_000, i64::MAX as u64] {
            let config = BlogConfig {
                staleness_hours: hours,
                ..BlogConfig::default()
            };
            assert_eq!(config.staleness_window(), default_window, "hours = {hours}");
        }

        let config = BlogConfig {
            staleness_hours: 6,
            ..BlogConfig::default()
        };
        assert_eq!(config.staleness_window(), chrono::Duration::hours(6));
    }
}
