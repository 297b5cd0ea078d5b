//! Building blocks for [`clap`]-driven configs.
//!
//! They can easily be re-used using `#[clap(flatten)]`.
pub mod partition_cache;

pub use partition_cache::PartitionCacheConfig;
