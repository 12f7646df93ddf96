//! Effective configuration: defaults, then an optional YAML file, then flags.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use wikiwatch_core::WatchConfig;

/// Flags shared by every command that needs a [`WatchConfig`].
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// YAML config file (missing keys take their defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Server-sent-event endpoint of the change feed
    #[arg(long)]
    pub url: Option<String>,

    /// Wiki to follow, e.g. enwiki
    #[arg(long)]
    pub wiki: Option<String>,

    /// Page title to track (repeatable; replaces the configured watch-list)
    #[arg(long = "entity", value_name = "TITLE")]
    pub entities: Vec<String>,

    /// Author whose edits always raise an alert
    #[arg(long)]
    pub target_user: Option<String>,

    /// Absolute size change (bytes) that raises an alert
    #[arg(long)]
    pub threshold: Option<u64>,

    /// Event log path
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Alert log path
    #[arg(long)]
    pub alerts: Option<PathBuf>,

    /// Global log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON structured logs
    #[arg(long)]
    pub json_logs: bool,
}

impl ConfigArgs {
    /// Build the effective configuration and validate it once, after the
    /// flags are applied.
    pub fn load(&self) -> Result<WatchConfig> {
        let mut config = match &self.config {
            Some(path) => WatchConfig::read_yaml_file(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => WatchConfig::default(),
        };
        self.apply(&mut config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn apply(&self, config: &mut WatchConfig) {
        if let Some(url) = &self.url {
            config.endpoint = url.clone();
        }
        if let Some(wiki) = &self.wiki {
            config.target_wiki = wiki.clone();
        }
        if !self.entities.is_empty() {
            config.watchlist = self.entities.clone();
        }
        if let Some(user) = &self.target_user {
            config.target_user = user.clone();
        }
        if let Some(threshold) = self.threshold {
            config.size_threshold = threshold;
        }
        if let Some(events) = &self.events {
            config.output.events = events.clone();
        }
        if let Some(alerts) = &self.alerts {
            config.output.alerts = alerts.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if self.json_logs {
            config.log.json = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_flags_gives_defaults() {
        let c = ConfigArgs::default().load().unwrap();
        assert_eq!(c.target_wiki, "enwiki");
        assert_eq!(c.size_threshold, 5000);
        assert_eq!(c.watchlist.len(), 5);
    }

    #[test]
    fn flags_override_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "target_wiki: dewiki\ntarget_user: Alice\nsize_threshold: 100").unwrap();

        let args = ConfigArgs {
            config: Some(f.path().to_path_buf()),
            threshold: Some(42),
            alerts: Some("out/a.csv".into()),
            json_logs: true,
            ..ConfigArgs::default()
        };
        let c = args.load().unwrap();
        assert_eq!(c.target_wiki, "dewiki");
        assert_eq!(c.target_user, "Alice");
        assert_eq!(c.size_threshold, 42);
        assert_eq!(c.output.alerts, PathBuf::from("out/a.csv"));
        assert!(c.log.json);
    }

    #[test]
    fn flags_can_repair_a_file_that_is_invalid_alone() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "output:\n  events: same.csv\n  alerts: same.csv").unwrap();

        let alone = ConfigArgs {
            config: Some(f.path().to_path_buf()),
            ..ConfigArgs::default()
        };
        assert!(alone.load().is_err());

        let repaired = ConfigArgs {
            config: Some(f.path().to_path_buf()),
            alerts: Some("other.csv".into()),
            ..ConfigArgs::default()
        };
        let c = repaired.load().unwrap();
        assert_eq!(c.output.events, PathBuf::from("same.csv"));
        assert_eq!(c.output.alerts, PathBuf::from("other.csv"));
    }

    #[test]
    fn overrides_are_validated() {
        let args = ConfigArgs {
            events: Some("same.csv".into()),
            alerts: Some("same.csv".into()),
            ..ConfigArgs::default()
        };
        let err = args.load().unwrap_err();
        assert!(format!("{err:#}").contains("different files"));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let args = ConfigArgs {
            config: Some("/no/such/wikiwatch.yaml".into()),
            ..ConfigArgs::default()
        };
        let err = args.load().unwrap_err();
        assert!(err.to_string().contains("/no/such/wikiwatch.yaml"));
    }
}
