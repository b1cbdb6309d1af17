// ABOUTME: Runtime settings with defaults, optional TOML file, and env overrides
// ABOUTME: Environment variables win over the file; both win over defaults

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 5;

/// Tunable runtime settings.
///
/// Resolution order: built-in defaults, then an optional TOML file, then the
/// `BATCH_SIZE`, `SYNC_INTERVAL_SECS`, and `POOL_SIZE` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Rows per upsert batch during full migration.
    pub batch_size: usize,
    /// Seconds between incremental sync cycles in watch mode.
    pub sync_interval_secs: u64,
    /// Target connection pool size.
    pub pool_size: usize,
    /// Seconds between resource monitor samples.
    pub monitor_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            pool_size: DEFAULT_POOL_SIZE,
            monitor_interval_secs: DEFAULT_MONITOR_INTERVAL_SECS,
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then apply env overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text)
                    .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?
            }
            None => Settings::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(value) = env_parse::<usize>("BATCH_SIZE")? {
            self.batch_size = value;
        }
        if let Some(value) = env_parse::<u64>("SYNC_INTERVAL_SECS")? {
            self.sync_interval_secs = value;
        }
        if let Some(value) = env_parse::<usize>("POOL_SIZE")? {
            self.pool_size = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.sync_interval_secs == 0 {
            return Err(Error::Config("sync_interval_secs must be at least 1".into()));
        }
        if self.pool_size == 0 {
            return Err(Error::Config("pool_size must be at least 1".into()));
        }
        if self.monitor_interval_secs == 0 {
            return Err(Error::Config(
                "monitor_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid {name}: '{raw}'"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.batch_size, 1000);
        assert_eq!(settings.sync_interval_secs, 300);
        assert_eq!(settings.pool_size, 10);
        assert_eq!(settings.sync_interval(), Duration::from_secs(300));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 250\nsync_interval_secs = 60").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.batch_size, 250);
        assert_eq!(settings.sync_interval_secs, 60);
        // Untouched fields keep their defaults
        assert_eq!(settings.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_sise = 250").unwrap();

        let result = Settings::load(Some(file.path()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut settings = Settings::default();
        settings.batch_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.pool_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/replicator.toml")));
        assert!(result.is_err());
    }
}
