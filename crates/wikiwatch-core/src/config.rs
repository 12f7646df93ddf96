//! Session configuration.
//!
//! A [`WatchConfig`] is built once at startup (defaults, then an optional YAML
//! file, then CLI overrides) and handed to the session by value. Nothing in
//! the pipeline reads global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::alert::AlertRuleSet;
use crate::error::ConfigError;
use crate::matcher::Watchlist;

pub const DEFAULT_ENDPOINT: &str = "https://stream.wikimedia.org/v2/stream/recentchange";
pub const DEFAULT_TARGET_WIKI: &str = "enwiki";
pub const DEFAULT_TARGET_USER: &str = "ExampleUser";
pub const DEFAULT_SIZE_THRESHOLD: u64 = 5_000;

/// Pages followed when no watch-list is configured.
pub const DEFAULT_ENTITIES: [&str; 5] = [
    "Bob vs. Society",
    "Lucio Anneo Seneca",
    "Our First Day",
    "Comedy film",
    "Drama film",
];

/// Paths of the two output logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    /// Every matched event.
    #[serde(default = "default_events_path")]
    pub events: PathBuf,
    /// The alert-triggering subset.
    #[serde(default = "default_alerts_path")]
    pub alerts: PathBuf,
}

fn default_events_path() -> PathBuf {
    PathBuf::from("data/wiki_events.csv")
}

fn default_alerts_path() -> PathBuf {
    PathBuf::from("data/wiki_alerts.csv")
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            events: default_events_path(),
            alerts: default_alerts_path(),
        }
    }
}

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Build an `EnvFilter` directive string, e.g. `"info,wikiwatch_stream=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Top-level configuration for one watch session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Server-sent-event endpoint of the change feed.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Only events whose `wiki` equals this are considered (e.g. `"enwiki"`).
    #[serde(default = "default_target_wiki")]
    pub target_wiki: String,
    /// Canonical page titles to follow, in priority order.
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
    /// Author whose edits always raise an alert.
    #[serde(default = "default_target_user")]
    pub target_user: String,
    /// Absolute size change (bytes) at or above which an edit raises an alert.
    #[serde(default = "default_size_threshold")]
    pub size_threshold: u64,
    #[serde(default)]
    pub output: OutputPaths,
    /// `User-Agent` sent to the feed. Wikimedia rejects anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for establishing the connection (the stream itself never times out).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_target_wiki() -> String {
    DEFAULT_TARGET_WIKI.into()
}
fn default_watchlist() -> Vec<String> {
    DEFAULT_ENTITIES.iter().map(|e| e.to_string()).collect()
}
fn default_target_user() -> String {
    DEFAULT_TARGET_USER.into()
}
fn default_size_threshold() -> u64 {
    DEFAULT_SIZE_THRESHOLD
}
fn default_user_agent() -> String {
    format!("wikiwatch/{}", env!("CARGO_PKG_VERSION"))
}
fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            target_wiki: default_target_wiki(),
            watchlist: default_watchlist(),
            target_user: default_target_user(),
            size_threshold: default_size_threshold(),
            output: OutputPaths::default(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log: LogConfig::default(),
        }
    }
}

impl WatchConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_yaml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_yaml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document without validating it, for callers that layer
    /// overrides on top before calling [`validate`](Self::validate).
    pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a YAML config file without validating it.
    pub fn read_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_yaml(&content)
    }

    /// Serialize back to YAML (used by `wikiwatch config`).
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "endpoint must not be empty".into(),
            });
        }
        if self.target_wiki.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "target_wiki must not be empty".into(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "connect_timeout_secs must be at least 1".into(),
            });
        }
        if self.output.events == self.output.alerts {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "event and alert logs must be different files (both are {})",
                    self.output.events.display()
                ),
            });
        }
        Ok(())
    }

    /// Settings that are valid but almost certainly not what the operator
    /// meant. Reported once logging is up.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.watchlist.is_empty() {
            warnings.push("watch-list is empty; no event will ever match".to_string());
        }
        warnings
    }

    pub fn watchlist(&self) -> Watchlist {
        Watchlist::new(self.watchlist.iter().cloned())
    }

    /// Alert rules in declaration order: target user, then large edit.
    pub fn alert_rules(&self) -> AlertRuleSet {
        AlertRuleSet::standard(self.target_user.clone(), self.size_threshold)
    }
}
