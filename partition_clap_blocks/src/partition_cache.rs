//! CLI config for the partition descriptor cache

use partition_bounds::CacheLimits;
use std::num::NonZeroUsize;

/// CLI config for the partition descriptor cache
#[derive(Debug, Clone, Copy, clap::Parser)]
pub struct PartitionCacheConfig {
    /// Maximum number of partitioned relations whose descriptors are kept in memory.
    ///
    /// Least recently used descriptors are evicted beyond this number. 0 keeps every
    /// descriptor.
    #[clap(
        long = "partition-desc-cache-max-entries",
        env = "PARTITION_DESC_CACHE_MAX_ENTRIES",
        default_value = "0",
        action
    )]
    pub max_entries: usize,

    /// When a relation's partitions are read again without having changed, keep serving the
    /// descriptor built before instead of the new copy.
    #[clap(
        long = "partition-desc-cache-retain-unchanged",
        env = "PARTITION_DESC_CACHE_RETAIN_UNCHANGED",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub retain_unchanged: bool,
}

impl From<&PartitionCacheConfig> for CacheLimits {
    fn from(config: &PartitionCacheConfig) -> Self {
        Self {
            max_entries: NonZeroUsize::new(config.max_entries),
            retain_unchanged: config.retain_unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults() {
        let config = PartitionCacheConfig::try_parse_from(["my_binary"]).unwrap();
        assert_eq!(config.max_entries, 0);
        assert!(config.retain_unchanged);
        assert_eq!(CacheLimits::from(&config), CacheLimits::default());
    }

    #[test]
    fn explicit_values() {
        let config = PartitionCacheConfig::try_parse_from([
            "my_binary",
            "--partition-desc-cache-max-entries",
            "128",
            "--partition-desc-cache-retain-unchanged",
            "false",
        ])
        .unwrap();

        let limits = CacheLimits::from(&config);
        assert_eq!(limits.max_entries, NonZeroUsize::new(128));
        assert!(!limits.retain_unchanged);
    }

    #[test]
    fn invalid_max_entries() {
        let error = PartitionCacheConfig::try_parse_from([
            "my_binary",
            "--partition-desc-cache-max-entries",
            "many",
        ])
        .unwrap_err()
        .to_string();
        assert!(
            error.contains("invalid value 'many' for '--partition-desc-cache-max-entries"),
            "{error}"
        );
    }
}
