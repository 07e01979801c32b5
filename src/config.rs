//! Skip List Configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Construction-time configuration for a [`SkipList`](crate::SkipList)
#[derive(Debug, Clone)]
pub struct Config {
    /// Highest level a node may be drawn at
    pub max_level: usize,

    /// Time since last access after which an entry is expired
    pub ttl: Duration,

    /// Recency cache capacity (0 = cache disabled)
    pub cache_capacity: usize,

    /// Separator between key and value in dump files
    pub delimiter: String,

    /// Dump file used by `dump_file` / `load_file`
    pub store_path: PathBuf,

    /// Interval of the background expiry sweeper
    pub sweep_interval: Duration,

    /// Fixed seed for level generation (None = seeded from OS entropy)
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_level: 16,
            ttl: Duration::from_secs(60),
            cache_capacity: 1024,
            delimiter: ":".to_string(),
            store_path: PathBuf::from("./store/dumpFile"),
            sweep_interval: Duration::from_secs(10),
            seed: None,
        }
    }
}

impl Config {
    /// Set maximum level
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set entry time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set recency cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set dump file delimiter
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set dump file path
    pub fn with_store_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = path.into();
        self
    }

    /// Set sweeper interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Use a deterministic level generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            return Err(Error::InvalidConfig("max_level must be at least 1".into()));
        }
        if self.max_level > u8::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "max_level {} exceeds {}",
                self.max_level,
                u8::MAX
            )));
        }
        if self.ttl.is_zero() {
            return Err(Error::InvalidConfig("ttl must be non-zero".into()));
        }
        if self.delimiter.is_empty() || self.delimiter.contains('\n') {
            return Err(Error::InvalidConfig(
                "delimiter must be non-empty and single-line".into(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(Error::InvalidConfig("sweep_interval must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter, ":");
        assert_eq!(config.store_path, PathBuf::from("./store/dumpFile"));
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_max_level(6)
            .with_ttl(Duration::from_secs(2))
            .with_cache_capacity(100)
            .with_delimiter("=")
            .with_seed(7);

        assert_eq!(config.max_level, 6);
        assert_eq!(config.ttl, Duration::from_secs(2));
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.delimiter, "=");
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::default().with_max_level(0).validate().is_err());
        assert!(Config::default().with_max_level(300).validate().is_err());
        assert!(Config::default().with_ttl(Duration::ZERO).validate().is_err());
        assert!(Config::default().with_delimiter("").validate().is_err());
        assert!(Config::default().with_delimiter("a\nb").validate().is_err());
        assert!(Config::default()
            .with_sweep_interval(Duration::ZERO)
            .validate()
            .is_err());
    }
}
